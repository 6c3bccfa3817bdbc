//! src/file_splitter.rs
use crate::error::JobError;
use crate::mapreduce::Record;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A byte range `[start, end)` of one input file. Both bounds sit on line
/// starts (or the end of the file), so a line never straddles two splits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputSplit {
    path: Arc<PathBuf>,
    start: u64,
    end: u64,
}

impl InputSplit {
    pub fn new(path: Arc<PathBuf>, start: u64, end: u64) -> Self {
        InputSplit { path, start, end }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Opens the file and returns a lazy iterator over the split's lines.
    /// Each call re-opens the file, so a split can be read any number of times.
    pub fn records(&self) -> Result<SplitRecords, JobError> {
        let file =
            File::open(self.path.as_path()).map_err(|e| JobError::source_io(self.path(), e))?;
        let mut reader = BufReader::new(file);
        reader
            .seek(SeekFrom::Start(self.start))
            .map_err(|e| JobError::source_io(self.path(), e))?;
        Ok(SplitRecords {
            reader,
            path: self.path.clone(),
            position: self.start,
            end: self.end,
            buf: Vec::new(),
        })
    }
}

pub struct SplitRecords {
    reader: BufReader<File>,
    path: Arc<PathBuf>,
    position: u64,
    end: u64,
    buf: Vec<u8>,
}

impl Iterator for SplitRecords {
    type Item = Result<Record, JobError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.end {
            return None;
        }
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => {
                self.position = self.end;
                None
            }
            Ok(n) => {
                let offset = self.position;
                self.position += n as u64;
                let content = decode_line(&self.buf, &self.path, offset);
                Some(Ok(Record::new(content, self.path.clone(), offset)))
            }
            Err(e) => {
                self.position = self.end;
                Some(Err(JobError::source_io(self.path.as_path(), e)))
            }
        }
    }
}

fn decode_line(bytes: &[u8], path: &Path, offset: u64) -> String {
    let line = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    match std::str::from_utf8(line) {
        Ok(line) => line.to_string(),
        Err(_) => {
            tracing::warn!(
                "line at {}:{offset} is not valid UTF-8, decoding lossily",
                path.display()
            );
            String::from_utf8_lossy(line).into_owned()
        }
    }
}

pub struct FileSplitter {
    split_size_in_bytes: u64,
    path: PathBuf,
}

impl FileSplitter {
    pub fn new(path: PathBuf, split_size_in_bytes: u64) -> Self {
        FileSplitter {
            split_size_in_bytes: split_size_in_bytes.max(1),
            path,
        }
    }

    /// Cuts the file every `split_size_in_bytes`, moving each cut forward to
    /// the byte after the next newline.
    pub fn split(&self) -> Result<Vec<InputSplit>, JobError> {
        let file = File::open(&self.path).map_err(|e| JobError::source_io(&self.path, e))?;
        let len = file
            .metadata()
            .map_err(|e| JobError::source_io(&self.path, e))?
            .len();
        let path = Arc::new(self.path.clone());
        let mut reader = BufReader::new(file);
        let mut splits = Vec::new();
        let mut start = 0;

        while start < len {
            let candidate = start.saturating_add(self.split_size_in_bytes);
            let end = if candidate >= len {
                len
            } else {
                // Starting one byte early keeps a cut that already sits on a line start.
                reader
                    .seek(SeekFrom::Start(candidate - 1))
                    .map_err(|e| JobError::source_io(&self.path, e))?;
                let skipped = reader
                    .skip_until(b'\n')
                    .map_err(|e| JobError::source_io(&self.path, e))?;
                (candidate - 1 + skipped as u64).min(len)
            };
            splits.push(InputSplit::new(path.clone(), start, end));
            start = end;
        }
        tracing::debug!(
            "split {} ({len} bytes) into {} splits",
            self.path.display(),
            splits.len()
        );
        Ok(splits)
    }
}

/// Expands input locators into the list of files to read. Directories
/// contribute their regular files in name order, skipping hidden (`.`) and
/// marker (`_`) files.
pub fn resolve_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, JobError> {
    let mut files = Vec::new();
    for input in inputs {
        let metadata = fs::metadata(input).map_err(|e| JobError::source_io(input, e))?;
        if !metadata.is_dir() {
            files.push(input.clone());
            continue;
        }
        let mut entries = vec![];
        for entry in fs::read_dir(input).map_err(|e| JobError::source_io(input, e))? {
            let entry = entry.map_err(|e| JobError::source_io(input, e))?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with('.') || name.starts_with('_') {
                continue;
            }
            let path = entry.path();
            if path.is_file() {
                entries.push(path);
            }
        }
        entries.sort();
        files.extend(entries);
    }
    Ok(files)
}

/// The job's input, resolved to files and cut into splits. Record order is
/// preserved within a split; splits are independent of each other.
#[derive(Debug, Clone)]
pub struct RecordSource {
    files: Vec<PathBuf>,
    splits: Vec<InputSplit>,
}

impl RecordSource {
    #[tracing::instrument(name = "Open record source", skip(inputs))]
    pub fn open(inputs: &[PathBuf], split_size_in_bytes: u64) -> Result<Self, JobError> {
        let files = resolve_inputs(inputs)?;
        let mut splits = vec![];
        for file in &files {
            splits.extend(FileSplitter::new(file.clone(), split_size_in_bytes).split()?);
        }
        Ok(RecordSource { files, splits })
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn splits(&self) -> &[InputSplit] {
        &self.splits
    }

    pub fn into_splits(self) -> Vec<InputSplit> {
        self.splits
    }

    pub fn records(&self) -> impl Iterator<Item = Result<Record, JobError>> + '_ {
        self.splits.iter().flat_map(
            |split| -> Box<dyn Iterator<Item = Result<Record, JobError>>> {
                match split.records() {
                    Ok(records) => Box::new(records),
                    Err(e) => Box::new(std::iter::once(Err(e))),
                }
            },
        )
    }
}
