//! src/configuration.rs
use serde_aux::field_attributes::deserialize_number_from_string;
use std::path::{Path, PathBuf};

#[derive(serde::Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct Settings {
    pub engine: EngineSettings,
    pub telemetry: TelemetrySettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
#[serde(default)]
pub struct EngineSettings {
    /// Size of the map worker pool.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub workers: usize,
    /// Number of shuffle buckets, which is also the number of reduce tasks.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub partitions: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub split_size_bytes: u64,
    pub combiner: bool,
    pub sort_output: bool,
    /// Buffered map output spills here when set; otherwise it stays in memory.
    pub spill_dir: Option<PathBuf>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub spill_threshold: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            partitions: 16,
            split_size_bytes: 32 * 1024 * 1024,
            combiner: true,
            sort_output: false,
            spill_dir: None,
            spill_threshold: 1_000_000,
        }
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
#[serde(default)]
pub struct TelemetrySettings {
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        TelemetrySettings {
            service_name: "mapreduce".to_string(),
            log_level: "info".to_string(),
            otlp_endpoint: None,
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path =
        std::env::current_dir().map_err(|e| config::ConfigError::Foreign(Box::new(e)))?;
    load_settings(&base_path.join("configuration"), environment())
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("MAPREDUCE")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Layers `base.yaml` from `config_dir` (if present) under the environment.
pub fn load_settings(
    config_dir: &Path,
    environment: config::Environment,
) -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(config_dir.join("base.yaml")).required(false))
        .add_source(environment)
        .build()?;
    settings.try_deserialize::<Settings>()
}
