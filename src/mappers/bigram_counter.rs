//! src/mappers/bigram_counter.rs
use crate::cache::BroadcastCache;
use crate::functions::{MapEmitter, tokenize};
use crate::mapreduce::Record;

/// Emits `("first second", 1)` for every adjacent token pair of the line.
/// Pairs never span two records.
pub fn count_bigrams(record: &Record, _cache: &BroadcastCache, emitter: &mut dyn MapEmitter) {
    let mut tokens = tokenize(record.content());
    let Some(mut previous) = tokens.next() else {
        return;
    };
    for token in tokens {
        emitter.emit(format!("{previous} {token}"), 1);
        previous = token;
    }
}
