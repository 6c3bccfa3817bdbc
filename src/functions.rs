//! src/functions.rs
use crate::cache::BroadcastCache;
use crate::mapreduce::{Key, KeyValue, Record, Value};

/// Sink for the pairs a map function produces.
pub trait MapEmitter {
    fn emit(&mut self, key: Key, value: Value);
}

impl MapEmitter for Vec<KeyValue> {
    fn emit(&mut self, key: Key, value: Value) {
        self.push(KeyValue::new(key, value));
    }
}

/// Turns one record into zero or more pairs. Must not fail on odd content.
pub type MapFn = fn(record: &Record, cache: &BroadcastCache, emitter: &mut dyn MapEmitter);

/// Merges all values for one key. Must be associative and commutative: the
/// engine may apply it to partial groups (combining) in any order.
pub type ReduceFn = fn(key: &str, values: &mut dyn Iterator<Item = Value>) -> Value;

/// The user logic of a job.
#[derive(Clone, Copy, Debug)]
pub struct JobFunctions {
    pub mapper: MapFn,
    pub reducer: ReduceFn,
    /// Local pre-aggregation run on each worker before the shuffle.
    pub combiner: Option<ReduceFn>,
}

impl JobFunctions {
    pub fn new(mapper: MapFn, reducer: ReduceFn) -> Self {
        JobFunctions {
            mapper,
            reducer,
            combiner: None,
        }
    }

    pub fn with_combiner(mut self, combiner: ReduceFn) -> Self {
        self.combiner = Some(combiner);
        self
    }
}

/// ASCII space, tab, newline, carriage return and form feed. Other Unicode
/// whitespace (no-break space, ideographic space, ...) is part of a token.
pub const DELIMITERS: [char; 5] = [' ', '\t', '\n', '\r', '\x0C'];

/// Splits on runs of `DELIMITERS`, keeping token order.
pub fn tokenize(line: &str) -> impl Iterator<Item = &str> {
    line.split(DELIMITERS).filter(|token| !token.is_empty())
}
