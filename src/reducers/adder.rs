//! src/reducers/adder.rs
use crate::mapreduce::Value;

/// Sums the counts for a key.
pub fn add(_key: &str, values: &mut dyn Iterator<Item = Value>) -> Value {
    values.sum()
}
