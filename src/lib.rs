//! src/lib.rs
pub mod cache;
pub mod configuration;
pub mod emitter;
pub mod error;
pub mod file_splitter;
pub mod functions;
pub mod job;
pub mod mappers;
pub mod mapreduce;
pub mod master;
pub mod reducers;
pub mod registry;
pub mod shuffle;
pub mod spec;
pub mod storage;
pub mod telemetry;
#[cfg(test)]
mod test_utils;
pub mod worker;
