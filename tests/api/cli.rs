//! tests/api/cli.rs
use crate::helpers::{read_output, test_data_dir, write_file};
use assert_cmd::Command;
use predicates::prelude::*;

fn mapreduce() -> Command {
    let mut cmd = Command::cargo_bin("mapreduce").expect("Failed to find binary");
    cmd.env("RUST_LOG", "warn");
    cmd
}

#[test]
fn run_writes_the_counts_and_exits_successfully() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = dir.path().join("out.txt");

    mapreduce()
        .arg("run")
        .arg("unigram")
        .arg(test_data_dir().join("corpus"))
        .arg(&output)
        .args(["--workers", "2", "--partitions", "3", "--split-size", "10"])
        .assert()
        .success();

    let counts = read_output(&output);
    assert_eq!(counts["the"], 5);
    assert_eq!(counts.values().sum::<u64>(), 24);
}

#[test]
fn sorted_filtered_run_uses_the_cache_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = dir.path().join("out.txt");

    mapreduce()
        .arg("run")
        .arg("filtered-unigram")
        .arg(test_data_dir().join("corpus"))
        .arg(&output)
        .arg(test_data_dir().join("patterns.txt"))
        .arg("--sort")
        .assert()
        .success();

    let text = std::fs::read_to_string(&output).expect("Failed to read output");
    assert_eq!(text, "cat\t4\ndog\t4\nthe\t5\n");
}

#[test]
fn a_missing_input_is_reported_as_a_source_error() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    mapreduce()
        .arg("run")
        .arg("bigram")
        .arg(dir.path().join("absent.txt"))
        .arg(dir.path().join("out.txt"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("SourceError"));
}

#[test]
fn filtered_unigram_without_a_cache_file_is_rejected() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let input = write_file(dir.path(), "input.txt", "cat dog\n");

    mapreduce()
        .arg("run")
        .arg("filtered-unigram")
        .arg(input)
        .arg(dir.path().join("out.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("InvalidSpecError"));
}

#[test]
fn an_unknown_job_kind_is_a_usage_error() {
    mapreduce()
        .args(["run", "trigram", "in.txt", "out.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("trigram"));
}
