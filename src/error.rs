//! src/error.rs
use std::path::PathBuf;

pub fn error_chain_fmt(
    f: &mut std::fmt::Formatter<'_>,
    e: &impl std::error::Error,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}

#[derive(thiserror::Error)]
pub enum JobError {
    #[error("Failed to read input {}", path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to load cache file {}", path.display())]
    CacheLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write output {}", path.display())]
    Sink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to spill intermediate data to {}", path.display())]
    Spill {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Job was cancelled")]
    Cancelled,
    #[error("Invalid job specification: {0}")]
    InvalidSpec(String),
    #[error("Worker task failed: {0}")]
    Worker(String),
}

impl std::fmt::Debug for JobError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(f, self)
    }
}

impl JobError {
    pub fn category(&self) -> &'static str {
        match self {
            JobError::Source { .. } => "SourceError",
            JobError::CacheLoad { .. } => "CacheLoadError",
            JobError::Sink { .. } => "SinkError",
            JobError::Spill { .. } => "SpillError",
            JobError::Cancelled => "CancellationError",
            JobError::InvalidSpec(_) => "InvalidSpecError",
            JobError::Worker(_) => "WorkerError",
        }
    }

    pub fn is_cancellation(&self) -> bool {
        matches!(self, JobError::Cancelled)
    }

    pub(crate) fn source_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        JobError::Source {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn sink_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        JobError::Sink {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn spill_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        JobError::Spill {
            path: path.into(),
            source,
        }
    }
}
