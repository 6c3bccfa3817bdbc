//! src/storage/local.rs
use crate::error::JobError;
use crate::mapreduce::KeyValue;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes final results as `key<TAB>value` lines to a single file.
#[derive(Debug, Clone)]
pub struct OutputSink {
    path: PathBuf,
    sort: bool,
}

impl OutputSink {
    pub fn new(path: impl Into<PathBuf>, sort: bool) -> Self {
        OutputSink {
            path: path.into(),
            sort,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of lines written. With sorting enabled, lines are
    /// ordered by key bytes.
    #[tracing::instrument(name = "Write output", skip(self, results), fields(path = %self.path.display()))]
    pub fn write(&self, mut results: Vec<KeyValue>) -> Result<usize, JobError> {
        if self.sort {
            results.sort_unstable_by(|a, b| a.key().cmp(b.key()));
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| JobError::sink_io(&self.path, e))?;
        }
        let file = File::create(&self.path).map_err(|e| JobError::sink_io(&self.path, e))?;
        write_pairs(file, &results).map_err(|e| JobError::sink_io(&self.path, e))?;
        tracing::debug!("wrote {} lines", results.len());
        Ok(results.len())
    }
}

fn write_pairs(file: File, pairs: &[KeyValue]) -> std::io::Result<()> {
    let mut writer = BufWriter::with_capacity(64 * 1024, file);
    for pair in pairs {
        writeln!(writer, "{}\t{}", pair.key(), pair.value())?;
    }
    writer.flush()
}

/// Spill lines are `<key length>:<key>\t<value>`, so keys may hold any
/// character, tabs and newlines included.
pub fn write_spill(path: &Path, pairs: &[KeyValue]) -> Result<(), JobError> {
    let file = File::create(path).map_err(|e| JobError::spill_io(path, e))?;
    write_spill_lines(file, pairs).map_err(|e| JobError::spill_io(path, e))
}

fn write_spill_lines(file: File, pairs: &[KeyValue]) -> std::io::Result<()> {
    let mut writer = BufWriter::with_capacity(64 * 1024, file);
    for pair in pairs {
        writeln!(writer, "{}:{}\t{}", pair.key().len(), pair.key(), pair.value())?;
    }
    writer.flush()
}

pub fn read_spill(path: &Path) -> Result<Vec<KeyValue>, JobError> {
    let text = fs::read_to_string(path).map_err(|e| JobError::spill_io(path, e))?;
    parse_spill(&text).ok_or_else(|| {
        JobError::spill_io(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidData, "malformed spill file"),
        )
    })
}

fn parse_spill(mut rest: &str) -> Option<Vec<KeyValue>> {
    let mut pairs = vec![];
    while !rest.is_empty() {
        let (len, tail) = rest.split_once(':')?;
        let len: usize = len.parse().ok()?;
        let key = tail.get(..len)?;
        let (value, tail) = tail.get(len..)?.strip_prefix('\t')?.split_once('\n')?;
        pairs.push(KeyValue::new(key, value.parse().ok()?));
        rest = tail;
    }
    Some(pairs)
}
