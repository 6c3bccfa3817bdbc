//! src/mapreduce.rs
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub type Key = String;
pub type Value = u64;

/// One line of input, tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    content: String,
    source: Arc<PathBuf>,
    offset: u64,
}

impl Record {
    pub fn new(content: String, source: Arc<PathBuf>, offset: u64) -> Self {
        Record {
            content,
            source,
            offset,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Byte offset of the start of the line within its source file.
    pub fn offset(&self) -> u64 {
        self.offset
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyValue {
    key: Key,
    value: Value,
}

impl KeyValue {
    pub fn new(key: impl Into<Key>, value: Value) -> Self {
        KeyValue {
            key: key.into(),
            value,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> Value {
        self.value
    }

    pub fn into_parts(self) -> (Key, Value) {
        (self.key, self.value)
    }
}

/// Every value observed for one key across all workers. Consumed by exactly
/// one reduce invocation.
#[derive(Debug)]
pub struct Group {
    key: Key,
    values: Vec<Value>,
}

impl Group {
    pub fn new(key: Key, values: Vec<Value>) -> Self {
        Group { key, values }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_parts(self) -> (Key, Vec<Value>) {
        (self.key, self.values)
    }
}
