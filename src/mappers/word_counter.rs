//! src/mappers/word_counter.rs
use crate::cache::BroadcastCache;
use crate::functions::{MapEmitter, tokenize};
use crate::mapreduce::Record;

/// Emits `(token, 1)` for every token of the line.
pub fn count_words(record: &Record, _cache: &BroadcastCache, emitter: &mut dyn MapEmitter) {
    for word in tokenize(record.content()) {
        emitter.emit(word.to_string(), 1);
    }
}
