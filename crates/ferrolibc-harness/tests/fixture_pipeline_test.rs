//! Integration test: checked-in conformance fixtures
//!
//! Validates that:
//! 1. Every fixture file under tests/conformance/fixtures parses.
//! 2. Case names are unique per family and every function dispatches.
//! 3. Every case passes against ferrolibc-core.
//! 4. The CLI `verify` command writes a report, a valid log, and an
//!    artifact index whose digests match the files.
//!
//! Run: cargo test -p ferrolibc-harness --test fixture_pipeline_test

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Command;

use ferrolibc_harness::structured_log::{ArtifactIndex, validate_log_file};
use ferrolibc_harness::{FixtureSet, TestRunner, VerificationSummary};

fn repo_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf()
}

fn fixture_dir() -> PathBuf {
    repo_root().join("tests/conformance/fixtures")
}

fn load_sets() -> Vec<(PathBuf, FixtureSet)> {
    FixtureSet::load_all(&fixture_dir()).expect("fixtures load")
}

#[test]
fn every_family_has_fixtures() {
    let families: HashSet<String> = load_sets().into_iter().map(|(_, s)| s.family).collect();
    for family in ["string", "memory", "wide", "path", "mode", "size", "escape"] {
        assert!(families.contains(family), "No fixture set for family {family}");
    }
}

#[test]
fn fixture_files_are_well_formed() {
    for (path, set) in load_sets() {
        assert_eq!(set.version, "v1", "{}", path.display());
        assert!(!set.cases.is_empty(), "{} has no cases", path.display());

        let mut names = HashSet::new();
        for case in &set.cases {
            assert!(
                names.insert(case.name.as_str()),
                "Duplicate case {} in {}",
                case.name,
                path.display()
            );
            assert!(!case.reference.is_empty(), "{} lacks a reference", case.name);
            if case.expected_errno != 0 {
                assert!(
                    case.expected_output.starts_with('E'),
                    "{}: error cases render an errno name",
                    case.name
                );
            }
        }
    }
}

#[test]
fn every_fixture_case_passes() {
    let runner = TestRunner::new("fixture-pipeline");
    let mut results = Vec::new();
    for (_, set) in load_sets() {
        results.extend(runner.run(&set));
    }
    let summary = VerificationSummary::from_results(results);
    let failures: Vec<String> = summary
        .failures()
        .map(|r| {
            format!(
                "{}/{}: expected {:?} (errno {}), got {:?} (errno {})",
                r.family, r.case_name, r.expected, r.expected_errno, r.actual, r.actual_errno
            )
        })
        .collect();
    assert!(summary.total > 100, "Expected a broad fixture corpus");
    assert!(failures.is_empty(), "Failing cases:\n{}", failures.join("\n"));
}

#[test]
fn cli_verify_writes_report_log_and_index() {
    let out = std::env::temp_dir().join(format!("ferrolibc_cli_verify_{}", std::process::id()));
    std::fs::create_dir_all(&out).unwrap();
    let report = out.join("report.md");
    let log = out.join("verify.log.jsonl");
    let index = out.join("artifacts.json");

    let output = Command::new(env!("CARGO_BIN_EXE_ferrolibc-harness"))
        .arg("verify")
        .arg("--fixture")
        .arg(fixture_dir())
        .arg("--report")
        .arg(&report)
        .arg("--log")
        .arg(&log)
        .arg("--artifact-index")
        .arg(&index)
        .args(["--timestamp", "2026-10-19T00:00:00Z"])
        .output()
        .expect("failed to run ferrolibc-harness");
    assert!(
        output.status.success(),
        "verify failed:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let markdown = std::fs::read_to_string(&report).unwrap();
    assert!(markdown.contains("- Timestamp: 2026-10-19T00:00:00Z"));
    assert!(markdown.contains("- Failed: 0"));

    let (lines, errors) = validate_log_file(&log).unwrap();
    assert!(lines > 100);
    assert!(errors.is_empty(), "log violations: {errors:?}");

    let index: ArtifactIndex =
        serde_json::from_str(&std::fs::read_to_string(&index).unwrap()).unwrap();
    let kinds: Vec<&str> = index.artifacts.iter().map(|a| a.kind.as_str()).collect();
    assert_eq!(kinds, ["report_markdown", "log_jsonl"]);
    assert!(index.stale_artifacts().is_empty());

    std::fs::remove_dir_all(&out).ok();
}

#[test]
fn cli_codec_commands_round_trip() {
    let run = |args: &[&str]| {
        let output = Command::new(env!("CARGO_BIN_EXE_ferrolibc-harness"))
            .args(args)
            .output()
            .expect("failed to run ferrolibc-harness");
        assert!(output.status.success(), "{args:?} failed");
        String::from_utf8(output.stdout).unwrap().trim_end().to_string()
    };

    assert_eq!(run(&["mode", "u+x", "--base", "644"]), "0744");
    assert_eq!(run(&["mode", "4755", "--render"]), "rwsr-xr-x");
    assert_eq!(run(&["size", "1.5KiB"]), "1536");
    assert_eq!(run(&["size", "1536", "--render", "--units", "binary"]), "1.5KiB");
    assert_eq!(run(&["clean", "a/./b//../c/"]), "a/c");
    assert_eq!(run(&["relpath", "/a/b/c", "--reference", "/a/d"]), "../b/c");
    assert_eq!(run(&["escape", "tab\there"]), "tab\\there");
    assert_eq!(run(&["unescape", "tab\\there"]), "tab\there");
}

#[test]
fn cli_reports_codec_errors_by_errno_name() {
    let output = Command::new(env!("CARGO_BIN_EXE_ferrolibc-harness"))
        .args(["size", "1K2K", "--units", "decimal"])
        .output()
        .expect("failed to run ferrolibc-harness");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("EINVAL"));
}
