//! tests/api/helpers.rs
use corpus_mapreduce::configuration::{EngineSettings, TelemetrySettings};
use corpus_mapreduce::error::JobError;
use corpus_mapreduce::job::{JobReport, MapReduceJob};
use corpus_mapreduce::registry::JobKind;
use corpus_mapreduce::spec::JobSpec;
use corpus_mapreduce::telemetry::init_tracing;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

// Set TEST_LOG to see the engine's logs while tests run.
static TRACING: LazyLock<()> = LazyLock::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        let settings = TelemetrySettings {
            log_level: "debug".to_string(),
            ..TelemetrySettings::default()
        };
        init_tracing(&settings).expect("Failed to setup tracing");
    }
});

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

/// Tiny splits so that even short inputs are spread across workers.
pub fn engine_settings() -> EngineSettings {
    EngineSettings {
        workers: 4,
        partitions: 5,
        split_size_bytes: 8,
        ..EngineSettings::default()
    }
}

pub struct TestJob {
    pub kind: JobKind,
    pub inputs: Vec<PathBuf>,
    pub cache_file: Option<PathBuf>,
    pub combiner: bool,
    pub settings: EngineSettings,
}

impl TestJob {
    pub fn new(kind: JobKind, input: PathBuf) -> Self {
        TestJob {
            kind,
            inputs: vec![input],
            cache_file: None,
            combiner: true,
            settings: engine_settings(),
        }
    }

    pub fn with_cache(mut self, cache_file: PathBuf) -> Self {
        self.cache_file = Some(cache_file);
        self
    }

    pub fn with_combiner(mut self, combiner: bool) -> Self {
        self.combiner = combiner;
        self
    }

    pub async fn run(
        self,
        output: PathBuf,
    ) -> Result<(JobReport, HashMap<String, u64>), JobError> {
        LazyLock::force(&TRACING);
        let mut spec = JobSpec::new(self.kind, output);
        for input in self.inputs {
            spec.add_input(input);
        }
        if let Some(cache_file) = self.cache_file {
            spec.set_cache_file(cache_file);
        }
        spec.set_combiner_enabled(self.combiner);
        let mut job = MapReduceJob::new(spec, self.settings);
        let report = job.run().await?;
        let counts = read_output(&report.output);
        Ok((report, counts))
    }
}

pub fn read_output(path: &Path) -> HashMap<String, u64> {
    let text = std::fs::read_to_string(path).expect("Failed to read output");
    let mut counts = HashMap::new();
    for line in text.lines() {
        let (key, value) = line.rsplit_once('\t').expect("Missing tab in output line");
        let previous = counts.insert(key.to_string(), value.parse().expect("Invalid count"));
        assert!(previous.is_none(), "key {key:?} written twice");
    }
    counts
}

pub fn counts(pairs: &[(&str, u64)]) -> HashMap<String, u64> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}
