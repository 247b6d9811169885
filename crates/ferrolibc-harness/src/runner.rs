//! Test execution engine.

use std::time::Instant;

use crate::diff;
use crate::execute::{Execution, execute_case};
use crate::fixtures::{FixtureCase, FixtureSet};
use crate::structured_log::{LogEmitter, LogLevel, Outcome, StreamKind};
use crate::verify::VerificationResult;

/// Runs fixture sets and collects verification results.
pub struct TestRunner {
    /// Name of the test campaign.
    pub campaign: String,
}

impl TestRunner {
    /// Create a new test runner.
    #[must_use]
    pub fn new(campaign: impl Into<String>) -> Self {
        Self {
            campaign: campaign.into(),
        }
    }

    /// Run all fixtures in a set and return results.
    pub fn run(&self, fixture_set: &FixtureSet) -> Vec<VerificationResult> {
        fixture_set
            .cases
            .iter()
            .map(|case| verify_case(&fixture_set.family, case).0)
            .collect()
    }

    /// Like [`run`](Self::run), also writing one log line per case plus a
    /// summary line for the set.
    pub fn run_logged(
        &self,
        fixture_set: &FixtureSet,
        log: &mut LogEmitter,
    ) -> std::io::Result<Vec<VerificationResult>> {
        let started = Instant::now();
        let mut results = Vec::with_capacity(fixture_set.cases.len());
        for case in &fixture_set.cases {
            let (result, latency_ns) = verify_case(&fixture_set.family, case);
            let (level, outcome) = if result.passed {
                (LogLevel::Info, Outcome::Pass)
            } else if result.actual.starts_with("unsupported:") {
                (LogLevel::Error, Outcome::Error)
            } else {
                (LogLevel::Error, Outcome::Fail)
            };
            let mut entry = log
                .entry(level, "case_result")
                .with_stream(StreamKind::Conformance)
                .with_api(&fixture_set.family, &case.function)
                .with_outcome(outcome)
                .with_errno(result.actual_errno)
                .with_latency_ns(latency_ns);
            if !result.passed {
                entry = entry.with_details(serde_json::json!({
                    "case": result.case_name,
                    "expected": result.expected,
                    "actual": result.actual,
                }));
            }
            log.emit_entry(entry)?;
            results.push(result);
        }

        let passed = results.iter().filter(|r| r.passed).count();
        let summary = log
            .entry(LogLevel::Info, "set_complete")
            .with_stream(StreamKind::Conformance)
            .with_duration_ms(u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX))
            .with_details(serde_json::json!({
                "campaign": self.campaign,
                "family": fixture_set.family,
                "total": results.len(),
                "passed": passed,
            }));
        log.emit_entry(summary)?;
        Ok(results)
    }
}

fn verify_case(family: &str, case: &FixtureCase) -> (VerificationResult, u64) {
    let started = Instant::now();
    let execution = execute_case(&case.function, &case.inputs);
    let latency_ns = u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX);

    let Execution { output, errno } = match execution {
        Ok(run) => run,
        Err(err) => Execution {
            output: format!("unsupported:{err}"),
            errno: 0,
        },
    };

    let output_matches = output == case.expected_output;
    let passed = output_matches && errno == case.expected_errno;
    let diff = if output_matches {
        (!passed).then(|| format!("errno: expected {}, got {errno}", case.expected_errno))
    } else {
        Some(diff::render_diff(&case.expected_output, &output))
    };

    let result = VerificationResult {
        family: family.to_string(),
        case_name: case.name.clone(),
        reference: case.reference.clone(),
        passed,
        expected: case.expected_output.clone(),
        actual: output,
        expected_errno: case.expected_errno,
        actual_errno: errno,
        diff,
    };
    (result, latency_ns)
}
