//! src/mappers/mod.rs
mod bigram_counter;
mod filtered_word_counter;
mod word_counter;

pub use bigram_counter::count_bigrams;
pub use filtered_word_counter::count_listed_words;
pub use word_counter::count_words;

#[cfg(test)]
pub(crate) fn run_mapper(
    mapper: crate::functions::MapFn,
    line: &str,
    cache: &crate::cache::BroadcastCache,
) -> Vec<crate::mapreduce::KeyValue> {
    use crate::mapreduce::Record;
    use std::path::PathBuf;
    use std::sync::Arc;

    let record = Record::new(line.to_string(), Arc::new(PathBuf::from("test.txt")), 0);
    let mut pairs = vec![];
    mapper(&record, cache, &mut pairs);
    pairs
}
