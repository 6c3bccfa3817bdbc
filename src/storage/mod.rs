//! src/storage/mod.rs
mod local;

pub use local::{OutputSink, read_spill, write_spill};
