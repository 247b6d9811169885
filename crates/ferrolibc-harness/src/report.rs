//! Report generation for conformance results.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::verify::VerificationSummary;

/// A conformance report over one verification run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConformanceReport {
    /// Report title.
    pub title: String,
    /// Timestamp (UTC).
    pub timestamp: String,
    /// Verification summary.
    pub summary: VerificationSummary,
}

impl ConformanceReport {
    /// Render the report as markdown.
    ///
    /// Failed cases are listed again after the table with their diffs.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# {}\n", self.title);
        let _ = writeln!(out, "- Timestamp: {}", self.timestamp);
        let _ = writeln!(out, "- Total: {}", self.summary.total);
        let _ = writeln!(out, "- Passed: {}", self.summary.passed);
        let _ = writeln!(out, "- Failed: {}\n", self.summary.failed);

        out.push_str("| Family | Passed | Failed |\n");
        out.push_str("|--------|--------|--------|\n");
        for tally in self.summary.by_family() {
            let _ = writeln!(out, "| {} | {} | {} |", tally.family, tally.passed, tally.failed);
        }
        out.push('\n');

        out.push_str("| Family | Case | Reference | Status |\n");
        out.push_str("|--------|------|-----------|--------|\n");
        for r in &self.summary.results {
            let status = if r.passed { "PASS" } else { "FAIL" };
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} |",
                r.family, r.case_name, r.reference, status
            );
        }

        if !self.summary.all_passed() {
            out.push_str("\n## Failures\n");
            for r in self.summary.failures() {
                let _ = writeln!(out, "\n### {}/{}\n", r.family, r.case_name);
                if r.expected_errno != r.actual_errno {
                    let _ = writeln!(
                        out,
                        "errno: expected {}, got {}\n",
                        r.expected_errno, r.actual_errno
                    );
                }
                if let Some(diff) = &r.diff {
                    let _ = writeln!(out, "```diff\n{}```", diff);
                }
            }
        }
        out
    }

    /// Render the report as JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}
