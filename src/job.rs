//! src/job.rs
use crate::cache::BroadcastCache;
use crate::configuration::EngineSettings;
use crate::emitter::PartitionedEmitter;
use crate::error::JobError;
use crate::file_splitter::{InputSplit, RecordSource};
use crate::mapreduce::KeyValue;
use crate::master::Master;
use crate::shuffle::{Shuffle, ShuffleBucket};
use crate::spec::JobSpec;
use crate::storage::OutputSink;
use crate::worker::{MapWorker, ReduceWorker};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobState {
    Init,
    LoadingCache,
    Mapping,
    Shuffling,
    Reducing,
    Writing,
    Done,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Done | JobState::Failed)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Init => "INIT",
            JobState::LoadingCache => "LOADING_CACHE",
            JobState::Mapping => "MAPPING",
            JobState::Shuffling => "SHUFFLING",
            JobState::Reducing => "REDUCING",
            JobState::Writing => "WRITING",
            JobState::Done => "DONE",
            JobState::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Summary of a job that reached `DONE`.
#[derive(Debug, Clone)]
pub struct JobReport {
    pub job_id: Uuid,
    pub name: String,
    pub files: usize,
    pub splits: usize,
    pub map_workers: usize,
    pub records_read: u64,
    /// Pairs produced by the mapper.
    pub pairs_emitted: u64,
    /// Pairs that reached the shuffle, after combining.
    pub pairs_shuffled: u64,
    pub keys_written: usize,
    pub output: PathBuf,
    pub state: JobState,
}

#[derive(Debug, Default)]
struct MapStats {
    map_workers: usize,
    records_read: u64,
    pairs_emitted: u64,
    pairs_shuffled: u64,
}

/// Drives one job through
/// `INIT → LOADING_CACHE → MAPPING → SHUFFLING → REDUCING → WRITING → DONE`,
/// or into `FAILED` from any of them.
pub struct MapReduceJob {
    job_id: Uuid,
    spec: JobSpec,
    settings: EngineSettings,
    state: JobState,
    history: Vec<JobState>,
    cancel: CancellationToken,
}

impl MapReduceJob {
    pub fn new(spec: JobSpec, settings: EngineSettings) -> Self {
        MapReduceJob {
            job_id: Uuid::new_v4(),
            spec,
            settings,
            state: JobState::Init,
            history: vec![JobState::Init],
            cancel: CancellationToken::new(),
        }
    }

    pub fn job_id(&self) -> &Uuid {
        &self.job_id
    }

    pub fn spec(&self) -> &JobSpec {
        &self.spec
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Every state the job has entered, in order.
    pub fn history(&self) -> &[JobState] {
        &self.history
    }

    /// Cancelling this token aborts the job: workers finish the record or
    /// group in hand, nothing further is scheduled, and `run` returns
    /// `JobError::Cancelled`.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    #[tracing::instrument(
        name = "Run MapReduceJob",
        skip(self),
        fields(job_id = %self.job_id, job = %self.spec.name())
    )]
    pub async fn run(&mut self) -> Result<JobReport, JobError> {
        if self.state != JobState::Init {
            return Err(JobError::InvalidSpec(format!(
                "job {} has already run",
                self.job_id
            )));
        }
        let spill_dir = self
            .settings
            .spill_dir
            .as_ref()
            .map(|dir| dir.join(format!("job-{}", self.job_id)));

        let result = self.execute(spill_dir.as_deref()).await;

        if let Some(dir) = &spill_dir {
            if let Err(e) = tokio::fs::remove_dir_all(dir).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("failed to remove spill directory {}: {e}", dir.display());
                }
            }
        }

        match result {
            Ok(report) => {
                tracing::info!(
                    "job finished: {} records, {} keys written to {}",
                    report.records_read,
                    report.keys_written,
                    report.output.display()
                );
                Ok(report)
            }
            Err(e) => {
                tracing::error!(category = e.category(), "job failed in {}: {e}", self.state);
                self.transition(JobState::Failed);
                Err(e)
            }
        }
    }

    fn transition(&mut self, next: JobState) {
        tracing::info!("{} -> {}", self.state, next);
        self.state = next;
        self.history.push(next);
    }

    /// Moves to `next` unless the caller has asked to abort.
    fn advance(&mut self, next: JobState) -> Result<(), JobError> {
        if self.cancel.is_cancelled() {
            return Err(JobError::Cancelled);
        }
        self.transition(next);
        Ok(())
    }

    async fn execute(&mut self, spill_dir: Option<&Path>) -> Result<JobReport, JobError> {
        self.spec.validate()?;

        self.advance(JobState::LoadingCache)?;
        let cache = Arc::new(self.load_cache().await?);

        self.advance(JobState::Mapping)?;
        let inputs = self.spec.inputs().to_vec();
        let split_size = self.settings.split_size_bytes;
        let source =
            tokio::task::spawn_blocking(move || RecordSource::open(&inputs, split_size))
                .await
                .map_err(join_error)??;
        let files = source.files().len();
        let splits = source.splits().len();
        if let Some(dir) = spill_dir {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| JobError::spill_io(dir, e))?;
        }
        let (shuffle, stats) = self.map(source.into_splits(), cache, spill_dir).await?;

        self.advance(JobState::Shuffling)?;
        let buckets = shuffle.finalize();

        self.advance(JobState::Reducing)?;
        let results = self.reduce(buckets).await?;

        self.advance(JobState::Writing)?;
        let sink = OutputSink::new(self.spec.output(), self.spec.sort_output());
        let keys_written = tokio::task::spawn_blocking(move || sink.write(results))
            .await
            .map_err(join_error)??;

        self.transition(JobState::Done);
        Ok(JobReport {
            job_id: self.job_id,
            name: self.spec.name().to_string(),
            files,
            splits,
            map_workers: stats.map_workers,
            records_read: stats.records_read,
            pairs_emitted: stats.pairs_emitted,
            pairs_shuffled: stats.pairs_shuffled,
            keys_written,
            output: self.spec.output().to_path_buf(),
            state: self.state,
        })
    }

    /// Without a cache file this is a no-op that yields an empty cache.
    async fn load_cache(&self) -> Result<BroadcastCache, JobError> {
        let Some(path) = self.spec.cache_file().map(Path::to_path_buf) else {
            return Ok(BroadcastCache::empty());
        };
        tokio::task::spawn_blocking(move || BroadcastCache::load(&path))
            .await
            .map_err(join_error)?
    }

    #[tracing::instrument(name = "Map phase", skip_all, fields(splits = splits.len()))]
    async fn map(
        &self,
        splits: Vec<InputSplit>,
        cache: Arc<BroadcastCache>,
        spill_dir: Option<&Path>,
    ) -> Result<(Shuffle, MapStats), JobError> {
        let functions = *self.spec.functions();
        let combiner = if self.spec.combiner_enabled() {
            functions.combiner
        } else {
            None
        };
        let partitions = self.settings.partitions.max(1);
        let halt = self.cancel.child_token();
        let master = Master::new(self.settings.workers, splits);
        let mut stats = MapStats {
            map_workers: master.worker_count(),
            ..MapStats::default()
        };

        let mut tasks = JoinSet::new();
        for assignment in master.into_assignments() {
            let mut emitter = PartitionedEmitter::new(assignment.worker_id, partitions, combiner);
            if let Some(dir) = spill_dir {
                emitter = emitter.with_spill(dir.to_path_buf(), self.settings.spill_threshold);
            }
            let worker = MapWorker::new(
                assignment,
                functions.mapper,
                cache.clone(),
                emitter,
                halt.clone(),
            );
            tasks.spawn_blocking(move || worker.run());
        }

        // Outputs are merged as workers finish; groups stay closed until all are in.
        let mut shuffle = Shuffle::new(partitions);
        let mut failure: Option<JobError> = None;
        while let Some(joined) = tasks.join_next().await {
            match joined.map_err(join_error).and_then(|result| result) {
                Ok(worker_output) if failure.is_none() => {
                    stats.records_read += worker_output.records_read;
                    stats.pairs_emitted += worker_output.output.emitted;
                    stats.pairs_shuffled += worker_output.output.handed_off;
                    shuffle.absorb(worker_output.output);
                }
                Ok(_) => {}
                Err(e) => {
                    halt.cancel();
                    failure = Some(keep_first_failure(failure, e));
                }
            }
        }
        if let Some(e) = failure {
            return Err(e);
        }
        tracing::debug!(
            "map phase done: {} records from {} workers",
            stats.records_read,
            stats.map_workers
        );
        Ok((shuffle, stats))
    }

    /// One reduce task per non-empty bucket. Spill files are read inside the
    /// task, so only the buckets being reduced are held in memory.
    #[tracing::instrument(name = "Reduce phase", skip_all, fields(buckets = buckets.len()))]
    async fn reduce(&self, buckets: Vec<ShuffleBucket>) -> Result<Vec<KeyValue>, JobError> {
        let reducer = self.spec.functions().reducer;
        let halt = self.cancel.child_token();
        let mut tasks = JoinSet::new();
        for (bucket, input) in buckets.into_iter().enumerate() {
            if input.is_empty() {
                continue;
            }
            let worker = ReduceWorker::new(bucket, input, reducer, halt.clone());
            tasks.spawn_blocking(move || worker.run());
        }

        let mut results = vec![];
        let mut failure: Option<JobError> = None;
        while let Some(joined) = tasks.join_next().await {
            match joined.map_err(join_error).and_then(|result| result) {
                Ok(mut reduced) => results.append(&mut reduced),
                Err(e) => {
                    halt.cancel();
                    failure = Some(keep_first_failure(failure, e));
                }
            }
        }
        match failure {
            Some(e) => Err(e),
            None => Ok(results),
        }
    }
}

/// A real failure wins over the cancellations it triggers in other workers.
fn keep_first_failure(current: Option<JobError>, next: JobError) -> JobError {
    match current {
        Some(current) if !current.is_cancellation() || next.is_cancellation() => current,
        _ => next,
    }
}

fn join_error(e: JoinError) -> JobError {
    JobError::Worker(e.to_string())
}
