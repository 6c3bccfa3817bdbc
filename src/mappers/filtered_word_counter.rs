//! src/mappers/filtered_word_counter.rs
use crate::cache::BroadcastCache;
use crate::functions::{MapEmitter, tokenize};
use crate::mapreduce::Record;

/// Like `count_words`, but only for tokens present in the broadcast cache.
pub fn count_listed_words(record: &Record, cache: &BroadcastCache, emitter: &mut dyn MapEmitter) {
    for word in tokenize(record.content()).filter(|word| cache.contains(word)) {
        emitter.emit(word.to_string(), 1);
    }
}
