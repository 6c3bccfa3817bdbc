//! tests/api/main.rs
mod cli;
mod helpers;
mod properties;
mod spec;
