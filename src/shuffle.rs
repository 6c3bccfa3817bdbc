//! src/shuffle.rs
use crate::emitter::MapOutput;
use crate::error::JobError;
use crate::mapreduce::{Group, Key, KeyValue, Value};
use crate::storage::read_spill;
use std::collections::HashMap;
use std::path::PathBuf;

/// Everything the shuffle holds for one bucket: values already in memory,
/// grouped by key, plus spill files that are only read by the reduce task
/// that owns the bucket.
#[derive(Debug, Default)]
pub struct ShuffleBucket {
    values: HashMap<Key, Vec<Value>>,
    spills: Vec<PathBuf>,
}

impl ShuffleBucket {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.spills.is_empty()
    }

    pub fn spills(&self) -> &[PathBuf] {
        &self.spills
    }

    /// Keys whose values arrived in memory rather than through a spill file.
    pub fn keys_in_memory(&self) -> usize {
        self.values.len()
    }

    /// Reads back the spill files and returns the complete groups of the
    /// bucket. A key appears in exactly one group.
    pub fn into_groups(self) -> Result<Vec<Group>, JobError> {
        let mut values = self.values;
        for path in &self.spills {
            for pair in read_spill(path)? {
                insert(&mut values, pair);
            }
        }
        Ok(values
            .into_iter()
            .map(|(key, values)| Group::new(key, values))
            .collect())
    }
}

/// Hash-partitioned collection of all map output. Worker outputs can be
/// absorbed as they arrive, but buckets only come out of `finalize`, which
/// consumes the shuffle and therefore can only run once every worker's
/// output has been absorbed.
#[derive(Debug)]
pub struct Shuffle {
    buckets: Vec<ShuffleBucket>,
    absorbed: usize,
}

impl Shuffle {
    pub fn new(partitions: usize) -> Self {
        Shuffle {
            buckets: (0..partitions.max(1))
                .map(|_| ShuffleBucket::default())
                .collect(),
            absorbed: 0,
        }
    }

    pub fn partition_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of worker outputs absorbed so far.
    pub fn absorbed(&self) -> usize {
        self.absorbed
    }

    /// In-memory pairs join their groups; spill files are only recorded.
    pub fn absorb(&mut self, output: MapOutput) {
        debug_assert_eq!(output.partitions.len(), self.buckets.len());
        for (bucket, partition) in self.buckets.iter_mut().zip(output.partitions) {
            for pair in partition.pairs {
                insert(&mut bucket.values, pair);
            }
            bucket.spills.extend(partition.spills);
        }
        self.absorbed += 1;
    }

    /// One bucket per partition, in partition order.
    pub fn finalize(self) -> Vec<ShuffleBucket> {
        tracing::debug!(
            "finalized {} buckets: {} keys in memory, {} spill files",
            self.buckets.len(),
            self.buckets
                .iter()
                .map(ShuffleBucket::keys_in_memory)
                .sum::<usize>(),
            self.buckets.iter().map(|b| b.spills.len()).sum::<usize>()
        );
        self.buckets
    }
}

fn insert(values: &mut HashMap<Key, Vec<Value>>, pair: KeyValue) {
    let (key, value) = pair.into_parts();
    values.entry(key).or_default().push(value);
}
