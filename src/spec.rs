//! src/spec.rs
use crate::error::JobError;
use crate::functions::JobFunctions;
use crate::registry::JobKind;
use std::path::{Path, PathBuf};

/// What to run and where: immutable once the job starts.
#[derive(Debug, Clone)]
pub struct JobSpec {
    name: String,
    inputs: Vec<PathBuf>,
    output: PathBuf,
    cache_file: Option<PathBuf>,
    functions: JobFunctions,
    requires_cache: bool,
    combiner_enabled: bool,
    sort_output: bool,
}

impl JobSpec {
    pub fn new(kind: JobKind, output: impl Into<PathBuf>) -> Self {
        let mut spec = Self::custom(kind.name(), kind.functions(), output);
        spec.requires_cache = kind.requires_cache();
        spec
    }

    /// A job with caller supplied functions.
    pub fn custom(name: &str, functions: JobFunctions, output: impl Into<PathBuf>) -> Self {
        JobSpec {
            name: name.to_string(),
            inputs: vec![],
            output: output.into(),
            cache_file: None,
            functions,
            requires_cache: false,
            combiner_enabled: true,
            sort_output: false,
        }
    }

    pub fn add_input(&mut self, input: impl Into<PathBuf>) {
        self.inputs.push(input.into());
    }

    pub fn set_cache_file(&mut self, cache_file: impl Into<PathBuf>) {
        self.cache_file = Some(cache_file.into());
    }

    pub fn set_combiner_enabled(&mut self, enabled: bool) {
        self.combiner_enabled = enabled;
    }

    pub fn set_sort_output(&mut self, sort: bool) {
        self.sort_output = sort;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn cache_file(&self) -> Option<&Path> {
        self.cache_file.as_deref()
    }

    pub fn functions(&self) -> &JobFunctions {
        &self.functions
    }

    pub fn combiner_enabled(&self) -> bool {
        self.combiner_enabled
    }

    pub fn sort_output(&self) -> bool {
        self.sort_output
    }

    pub fn validate(&self) -> Result<(), JobError> {
        if self.inputs.is_empty() {
            return Err(JobError::InvalidSpec(format!(
                "job '{}' has no inputs",
                self.name
            )));
        }
        if self.requires_cache && self.cache_file.is_none() {
            return Err(JobError::InvalidSpec(format!(
                "job '{}' requires a cache file",
                self.name
            )));
        }
        Ok(())
    }
}
