//! src/test_utils.rs
use crate::configuration::EngineSettings;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub fn test_data_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("data");
    path
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("Failed to write test file");
    path
}

/// Small splits and several workers, so tests exercise the parallel paths.
pub fn test_engine_settings() -> EngineSettings {
    EngineSettings {
        workers: 3,
        partitions: 4,
        split_size_bytes: 16,
        ..EngineSettings::default()
    }
}

pub fn read_output(path: &Path) -> HashMap<String, u64> {
    let text = std::fs::read_to_string(path).expect("Failed to read output");
    text.lines()
        .map(|line| {
            let (key, value) = line.rsplit_once('\t').expect("Missing tab in output line");
            (key.to_string(), value.parse().expect("Invalid count"))
        })
        .collect()
}
