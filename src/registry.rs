//! src/registry.rs
use crate::functions::{JobFunctions, MapFn};
use crate::mappers::{count_bigrams, count_listed_words, count_words};
use crate::reducers::add;
use std::fmt;
use std::str::FromStr;

/// The built-in jobs. Each kind maps to a fixed pair of map and reduce
/// functions; all three combine with the reducer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum JobKind {
    Unigram,
    Bigram,
    FilteredUnigram,
}

impl JobKind {
    pub const ALL: [JobKind; 3] = [JobKind::Unigram, JobKind::Bigram, JobKind::FilteredUnigram];

    pub fn name(&self) -> &'static str {
        match self {
            JobKind::Unigram => "unigram",
            JobKind::Bigram => "bigram",
            JobKind::FilteredUnigram => "filtered-unigram",
        }
    }

    pub fn functions(&self) -> JobFunctions {
        let mapper: MapFn = match self {
            JobKind::Unigram => count_words,
            JobKind::Bigram => count_bigrams,
            JobKind::FilteredUnigram => count_listed_words,
        };
        JobFunctions::new(mapper, add).with_combiner(add)
    }

    /// Whether the job reads a broadcast cache file.
    pub fn requires_cache(&self) -> bool {
        matches!(self, JobKind::FilteredUnigram)
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for JobKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("Job kind '{s}' not found"))
    }
}
