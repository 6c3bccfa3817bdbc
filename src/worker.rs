//! src/worker.rs
use crate::cache::BroadcastCache;
use crate::emitter::{MapOutput, PartitionedEmitter};
use crate::error::JobError;
use crate::functions::{MapFn, ReduceFn};
use crate::mapreduce::KeyValue;
use crate::master::MapAssignment;
use crate::shuffle::ShuffleBucket;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub struct MapWorkerOutput {
    pub worker_id: usize,
    pub records_read: u64,
    pub output: MapOutput,
}

/// Runs the mapper over its assigned splits, one record at a time.
pub struct MapWorker {
    assignment: MapAssignment,
    mapper: MapFn,
    cache: Arc<BroadcastCache>,
    emitter: PartitionedEmitter,
    cancel: CancellationToken,
}

impl MapWorker {
    pub fn new(
        assignment: MapAssignment,
        mapper: MapFn,
        cache: Arc<BroadcastCache>,
        emitter: PartitionedEmitter,
        cancel: CancellationToken,
    ) -> Self {
        MapWorker {
            assignment,
            mapper,
            cache,
            emitter,
            cancel,
        }
    }

    /// Stops with `JobError::Cancelled` before the next record once the token
    /// is cancelled.
    #[tracing::instrument(
        name = "Map worker",
        skip_all,
        fields(worker_id = self.assignment.worker_id, splits = self.assignment.splits.len())
    )]
    pub fn run(mut self) -> Result<MapWorkerOutput, JobError> {
        let mut records_read = 0;
        for split in &self.assignment.splits {
            for record in split.records()? {
                if self.cancel.is_cancelled() {
                    return Err(JobError::Cancelled);
                }
                let record = record?;
                (self.mapper)(&record, &self.cache, &mut self.emitter);
                records_read += 1;
                self.emitter.spill_if_full()?;
            }
        }
        let output = self.emitter.finish();
        tracing::debug!(
            "read {records_read} records, emitted {} pairs, handed off {}",
            output.emitted,
            output.handed_off
        );
        Ok(MapWorkerOutput {
            worker_id: self.assignment.worker_id,
            records_read,
            output,
        })
    }
}

/// Reduces every group of one shuffle bucket, reading the bucket's spill
/// files first.
pub struct ReduceWorker {
    bucket: usize,
    input: ShuffleBucket,
    reducer: ReduceFn,
    cancel: CancellationToken,
}

impl ReduceWorker {
    pub fn new(
        bucket: usize,
        input: ShuffleBucket,
        reducer: ReduceFn,
        cancel: CancellationToken,
    ) -> Self {
        ReduceWorker {
            bucket,
            input,
            reducer,
            cancel,
        }
    }

    /// Stops with `JobError::Cancelled` before the next group once the token
    /// is cancelled.
    #[tracing::instrument(
        name = "Reduce worker",
        skip_all,
        fields(bucket = self.bucket, spills = self.input.spills().len())
    )]
    pub fn run(self) -> Result<Vec<KeyValue>, JobError> {
        let groups = self.input.into_groups()?;
        let mut results = Vec::with_capacity(groups.len());
        for group in groups {
            if self.cancel.is_cancelled() {
                return Err(JobError::Cancelled);
            }
            let (key, values) = group.into_parts();
            let value = (self.reducer)(&key, &mut values.into_iter());
            results.push(KeyValue::new(key, value));
        }
        Ok(results)
    }
}
