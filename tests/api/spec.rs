//! tests/api/spec.rs
use claims::{assert_matches, assert_none, assert_ok, assert_some};
use corpus_mapreduce::error::JobError;
use corpus_mapreduce::registry::JobKind;
use corpus_mapreduce::spec::JobSpec;
use std::path::Path;

#[test]
fn you_should_be_able_to_create_a_job_spec_for_every_kind() {
    for kind in JobKind::ALL {
        let spec = JobSpec::new(kind, "/tmp/mapreduce/out.txt");
        assert_eq!(spec.name(), kind.name());
        assert_eq!(spec.output(), Path::new("/tmp/mapreduce/out.txt"));
        assert!(spec.inputs().is_empty());
        assert_some!(spec.functions().combiner);
    }
}

#[test]
fn you_should_be_able_to_configure_combining_and_sorting() {
    let mut spec = JobSpec::new(JobKind::Bigram, "out.txt");
    spec.add_input("input_0.txt");
    spec.set_combiner_enabled(false);
    spec.set_sort_output(true);
    assert!(!spec.combiner_enabled());
    assert!(spec.sort_output());
    assert_none!(spec.cache_file());
    assert_ok!(spec.validate());
}

#[test]
fn a_filtered_unigram_spec_without_cache_file_is_rejected() {
    let mut spec = JobSpec::new(JobKind::FilteredUnigram, "out.txt");
    spec.add_input("input_0.txt");
    assert_matches!(spec.validate(), Err(JobError::InvalidSpec(_)));
}
