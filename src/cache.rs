//! src/cache.rs
use crate::error::JobError;
use crate::functions::tokenize;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Reference data loaded once per job and shared read-only by every map
/// worker. There is no way to mutate it after `load`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BroadcastCache {
    entries: HashSet<String>,
}

impl BroadcastCache {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Reads the side file line by line and collects every whitespace
    /// separated token. Lines that are not valid UTF-8 are skipped; only a
    /// file that cannot be opened fails the load.
    #[tracing::instrument(name = "Load broadcast cache")]
    pub fn load(path: &Path) -> Result<Self, JobError> {
        let file = File::open(path).map_err(|source| JobError::CacheLoad {
            path: path.to_path_buf(),
            source,
        })?;
        if file.metadata().is_ok_and(|m| m.is_dir()) {
            return Err(JobError::CacheLoad {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::IsADirectory, "not a file"),
            });
        }
        let mut reader = BufReader::new(file);
        let mut entries = HashSet::new();
        let mut buf = Vec::new();
        let mut line_number = 0usize;
        let mut skipped = 0usize;

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    line_number += 1;
                    match std::str::from_utf8(&buf) {
                        Ok(line) => entries.extend(tokenize(line).map(str::to_string)),
                        Err(e) => {
                            skipped += 1;
                            tracing::warn!("skipping cache line {line_number}: {e}");
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        "stopped reading cache file after line {line_number}: {e}"
                    );
                    break;
                }
            }
        }

        tracing::info!(
            "loaded {} cache entries from {} ({skipped} lines skipped)",
            entries.len(),
            path.display()
        );
        Ok(BroadcastCache { entries })
    }

    pub fn contains(&self, token: &str) -> bool {
        self.entries.contains(token)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

impl FromIterator<String> for BroadcastCache {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        BroadcastCache {
            entries: iter.into_iter().collect(),
        }
    }
}
