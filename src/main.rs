//! src/main.rs
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use corpus_mapreduce::configuration::{Settings, get_configuration};
use corpus_mapreduce::job::MapReduceJob;
use corpus_mapreduce::registry::JobKind;
use corpus_mapreduce::spec::JobSpec;
use corpus_mapreduce::telemetry::init_tracing;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(version, about = "Keyed counting jobs over line-oriented text")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one job to completion.
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    #[arg(value_enum)]
    job_kind: JobKind,
    /// Input file or directory of files.
    input: PathBuf,
    /// Output file, one `key<TAB>count` line per key.
    output: PathBuf,
    /// Allow-list of tokens, required by `filtered-unigram`.
    cache_file: Option<PathBuf>,
    /// Number of map workers.
    #[arg(long)]
    workers: Option<usize>,
    /// Number of shuffle buckets.
    #[arg(long)]
    partitions: Option<usize>,
    /// Target input split size in bytes.
    #[arg(long)]
    split_size: Option<u64>,
    /// Ship raw map output to the shuffle without combining.
    #[arg(long)]
    no_combiner: bool,
    /// Sort the output by key.
    #[arg(long)]
    sort: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = match get_configuration().context("Failed to read configuration.") {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("ConfigurationError: {e:?}");
            return ExitCode::FAILURE;
        }
    };
    let tracer_provider = match init_tracing(&settings.telemetry) {
        Ok(provider) => provider,
        Err(e) => {
            eprintln!("TelemetryError: {e:?}");
            return ExitCode::FAILURE;
        }
    };

    let Command::Run(args) = cli.command;
    let code = run(args, settings).await;

    if let Some(provider) = tracer_provider {
        if let Err(e) = provider.shutdown() {
            eprintln!("failed to flush spans: {e}");
        }
    }
    code
}

async fn run(args: RunArgs, mut settings: Settings) -> ExitCode {
    if let Some(workers) = args.workers {
        settings.engine.workers = workers;
    }
    if let Some(partitions) = args.partitions {
        settings.engine.partitions = partitions;
    }
    if let Some(split_size) = args.split_size {
        settings.engine.split_size_bytes = split_size;
    }

    let mut spec = JobSpec::new(args.job_kind, args.output);
    spec.add_input(args.input);
    spec.set_combiner_enabled(settings.engine.combiner && !args.no_combiner);
    spec.set_sort_output(settings.engine.sort_output || args.sort);
    match args.cache_file {
        Some(cache_file) if args.job_kind.requires_cache() => spec.set_cache_file(cache_file),
        Some(cache_file) => tracing::warn!(
            "ignoring cache file {} for {} job",
            cache_file.display(),
            args.job_kind
        ),
        None => {}
    }

    let mut job = MapReduceJob::new(spec, settings.engine);
    let cancel = job.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling job");
            cancel.cancel();
        }
    });

    match job.run().await {
        Ok(report) => {
            tracing::info!(
                "{}: {} keys written to {}",
                report.name,
                report.keys_written,
                report.output.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {e:?}", e.category());
            if e.is_cancellation() {
                ExitCode::from(130)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
