//! tests/api/properties.rs
use crate::helpers::{TestJob, write_file};
use corpus_mapreduce::registry::JobKind;
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build runtime")
}

fn run_job(dir: &Path, job: TestJob, output: &str) -> HashMap<String, u64> {
    let (_, counts) = runtime()
        .block_on(job.run(dir.join(output)))
        .expect("Job failed");
    counts
}

fn write_lines(dir: &Path, lines: &[String]) -> PathBuf {
    let mut text = lines.join("\n");
    text.push('\n');
    write_file(dir, "input.txt", &text)
}

fn words(line: &str) -> impl Iterator<Item = &str> {
    line.split([' ', '\t', '\n', '\r', '\x0C'])
        .filter(|word| !word.is_empty())
}

fn naive_unigrams(lines: &[String]) -> HashMap<String, u64> {
    let mut counts = HashMap::new();
    for token in lines.iter().flat_map(|line| words(line)) {
        *counts.entry(token.to_string()).or_insert(0) += 1;
    }
    counts
}

fn naive_bigrams(lines: &[String]) -> HashMap<String, u64> {
    let mut counts = HashMap::new();
    for line in lines {
        let tokens: Vec<&str> = words(line).collect();
        for pair in tokens.windows(2) {
            *counts.entry(format!("{} {}", pair[0], pair[1])).or_insert(0) += 1;
        }
    }
    counts
}

fn lines() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-c ]{0,12}", 0..20)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn unigram_counts_match_a_sequential_count(lines in lines()) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let input = write_lines(dir.path(), &lines);
        let counts = run_job(dir.path(), TestJob::new(JobKind::Unigram, input), "out.txt");

        let expected = naive_unigrams(&lines);
        let total: usize = lines.iter().map(|l| words(l).count()).sum();
        prop_assert_eq!(counts.values().sum::<u64>(), total as u64);
        prop_assert_eq!(counts, expected);
    }

    #[test]
    fn bigram_counts_match_a_sequential_count(lines in lines()) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let input = write_lines(dir.path(), &lines);
        let counts = run_job(dir.path(), TestJob::new(JobKind::Bigram, input), "out.txt");

        let tokens: usize = lines.iter().map(|l| words(l).count()).sum();
        let non_empty = lines.iter().filter(|l| words(l).next().is_some()).count();
        prop_assert!(counts.len() <= tokens - non_empty);
        prop_assert_eq!(counts, naive_bigrams(&lines));
    }

    #[test]
    fn filtered_keys_are_drawn_from_the_allow_list(
        lines in lines(),
        allowed in prop::collection::hash_set("[a-c]{1,2}", 0..4),
    ) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let input = write_lines(dir.path(), &lines);
        let patterns: Vec<&str> = allowed.iter().map(String::as_str).collect();
        let cache = write_file(dir.path(), "patterns.txt", &patterns.join("\n"));
        let counts = run_job(
            dir.path(),
            TestJob::new(JobKind::FilteredUnigram, input).with_cache(cache),
            "out.txt",
        );

        let keys: HashSet<String> = counts.keys().cloned().collect();
        prop_assert!(keys.is_subset(&allowed));
        let unfiltered = naive_unigrams(&lines);
        for (key, count) in &counts {
            prop_assert_eq!(Some(count), unfiltered.get(key));
        }
        for key in allowed.iter().filter(|k| unfiltered.contains_key(*k)) {
            prop_assert!(counts.contains_key(key));
        }
    }

    #[test]
    fn the_combiner_never_changes_the_result(lines in lines()) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let input = write_lines(dir.path(), &lines);
        for kind in [JobKind::Unigram, JobKind::Bigram] {
            let combined = run_job(
                dir.path(),
                TestJob::new(kind, input.clone()),
                &format!("{kind}-combined.txt"),
            );
            let plain = run_job(
                dir.path(),
                TestJob::new(kind, input.clone()).with_combiner(false),
                &format!("{kind}-plain.txt"),
            );
            prop_assert_eq!(combined, plain);
        }
    }
}
