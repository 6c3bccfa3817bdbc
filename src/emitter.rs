//! src/emitter.rs
use crate::error::JobError;
use crate::functions::{MapEmitter, ReduceFn};
use crate::mapreduce::{Key, KeyValue, Value};
use crate::storage::write_spill;
use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::PathBuf;

/// Bucket for `key` among `partitions` shuffle buckets. Every worker must
/// agree on this, so it only depends on the key bytes.
pub fn partition_of(key: &str, partitions: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    (hasher.finish() % partitions.max(1) as u64) as usize
}

/// Groups `pairs` by key and merges each group with `combiner`.
pub fn combine(pairs: Vec<KeyValue>, combiner: ReduceFn) -> Vec<KeyValue> {
    let mut groups: HashMap<Key, Vec<Value>> = HashMap::new();
    for pair in pairs {
        let (key, value) = pair.into_parts();
        groups.entry(key).or_default().push(value);
    }
    groups
        .into_iter()
        .map(|(key, values)| {
            let merged = combiner(&key, &mut values.into_iter());
            KeyValue::new(key, merged)
        })
        .collect()
}

/// Map output of one partition: pairs still in memory plus any spill files.
#[derive(Debug, Default)]
pub struct PartitionOutput {
    pub pairs: Vec<KeyValue>,
    pub spills: Vec<PathBuf>,
}

/// Everything one map worker hands to the shuffle.
#[derive(Debug, Default)]
pub struct MapOutput {
    pub partitions: Vec<PartitionOutput>,
    /// Pairs emitted by the mapper.
    pub emitted: u64,
    /// Pairs handed to the shuffle, after combining.
    pub handed_off: u64,
}

#[derive(Debug)]
struct SpillTarget {
    dir: PathBuf,
    threshold: usize,
    sequence: usize,
}

/// Locally owned accumulator of one map worker. Pairs are bucketed by
/// partition as they are emitted and combined before they leave the worker.
#[derive(Debug)]
pub struct PartitionedEmitter {
    worker_id: usize,
    buffers: Vec<Vec<KeyValue>>,
    spills: Vec<Vec<PathBuf>>,
    combiner: Option<ReduceFn>,
    spill: Option<SpillTarget>,
    buffered: usize,
    emitted: u64,
    handed_off: u64,
}

impl PartitionedEmitter {
    pub fn new(worker_id: usize, partitions: usize, combiner: Option<ReduceFn>) -> Self {
        let partitions = partitions.max(1);
        PartitionedEmitter {
            worker_id,
            buffers: (0..partitions).map(|_| Vec::new()).collect(),
            spills: vec![Vec::new(); partitions],
            combiner,
            spill: None,
            buffered: 0,
            emitted: 0,
            handed_off: 0,
        }
    }

    /// Spill buffered pairs to `dir` once `threshold` of them have accumulated.
    pub fn with_spill(mut self, dir: PathBuf, threshold: usize) -> Self {
        self.spill = Some(SpillTarget {
            dir,
            threshold: threshold.max(1),
            sequence: 0,
        });
        self
    }

    pub fn partition_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn buffered(&self) -> usize {
        self.buffered
    }

    /// Writes the buffers out if a spill directory is set and the threshold
    /// has been reached. Called between records.
    pub fn spill_if_full(&mut self) -> Result<(), JobError> {
        let Some(target) = self.spill.as_mut() else {
            return Ok(());
        };
        if self.buffered < target.threshold {
            return Ok(());
        }
        let sequence = target.sequence;
        target.sequence += 1;
        let dir = target.dir.clone();

        for (partition, buffer) in self.buffers.iter_mut().enumerate() {
            if buffer.is_empty() {
                continue;
            }
            let pairs = drain_combined(buffer, self.combiner);
            let path = dir.join(format!(
                "w{:03}-s{:04}-R{:04}.txt",
                self.worker_id, sequence, partition
            ));
            write_spill(&path, &pairs)?;
            self.handed_off += pairs.len() as u64;
            self.spills[partition].push(path);
        }
        tracing::debug!(
            "worker {} spilled {} buffered pairs",
            self.worker_id,
            self.buffered
        );
        self.buffered = 0;
        Ok(())
    }

    pub fn finish(mut self) -> MapOutput {
        let combiner = self.combiner;
        let mut handed_off = self.handed_off;
        let partitions = self
            .buffers
            .iter_mut()
            .zip(self.spills)
            .map(|(buffer, spills)| {
                let pairs = drain_combined(buffer, combiner);
                handed_off += pairs.len() as u64;
                PartitionOutput { pairs, spills }
            })
            .collect();
        MapOutput {
            partitions,
            emitted: self.emitted,
            handed_off,
        }
    }
}

fn drain_combined(buffer: &mut Vec<KeyValue>, combiner: Option<ReduceFn>) -> Vec<KeyValue> {
    let pairs = std::mem::take(buffer);
    match combiner {
        Some(combiner) => combine(pairs, combiner),
        None => pairs,
    }
}

impl MapEmitter for PartitionedEmitter {
    fn emit(&mut self, key: Key, value: Value) {
        let partition = partition_of(&key, self.buffers.len());
        self.buffers[partition].push(KeyValue::new(key, value));
        self.buffered += 1;
        self.emitted += 1;
    }
}
