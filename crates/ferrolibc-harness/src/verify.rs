//! Output comparison and verification.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Outcome of one fixture case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub family: String,
    pub case_name: String,
    /// C standard, POSIX, or man page section the case pins.
    pub reference: String,
    /// Output and errno both matched.
    pub passed: bool,
    pub expected: String,
    pub actual: String,
    pub expected_errno: i32,
    pub actual_errno: i32,
    /// Present only for failures.
    pub diff: Option<String>,
}

/// Pass/fail counts for one function family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyTally {
    pub family: String,
    pub passed: usize,
    pub failed: usize,
}

/// Totals over a run plus every individual result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub results: Vec<VerificationResult>,
}

impl VerificationSummary {
    #[must_use]
    pub fn from_results(results: Vec<VerificationResult>) -> Self {
        let passed = results.iter().filter(|r| r.passed).count();
        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed,
            results,
        }
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Failed results only, in run order.
    pub fn failures(&self) -> impl Iterator<Item = &VerificationResult> {
        self.results.iter().filter(|r| !r.passed)
    }

    /// Per-family counts, sorted by family name.
    #[must_use]
    pub fn by_family(&self) -> Vec<FamilyTally> {
        let mut tallies = BTreeMap::<&str, FamilyTally>::new();
        for r in &self.results {
            let tally = tallies.entry(r.family.as_str()).or_insert_with(|| FamilyTally {
                family: r.family.clone(),
                ..FamilyTally::default()
            });
            if r.passed {
                tally.passed += 1;
            } else {
                tally.failed += 1;
            }
        }
        tallies.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, passed: bool) -> VerificationResult {
        in_family("string", name, passed)
    }

    fn in_family(family: &str, name: &str, passed: bool) -> VerificationResult {
        VerificationResult {
            family: family.to_string(),
            case_name: name.to_string(),
            reference: String::new(),
            passed,
            expected: String::from("1"),
            actual: String::from(if passed { "1" } else { "2" }),
            expected_errno: 0,
            actual_errno: 0,
            diff: None,
        }
    }

    #[test]
    fn summary_counts_pass_and_fail() {
        let summary =
            VerificationSummary::from_results(vec![result("a", true), result("b", false)]);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert!(!summary.all_passed());
        assert_eq!(summary.failures().map(|r| r.case_name.as_str()).collect::<Vec<_>>(), ["b"]);
    }

    #[test]
    fn empty_summary_passes() {
        assert!(VerificationSummary::from_results(Vec::new()).all_passed());
    }

    #[test]
    fn family_tallies_are_sorted() {
        let summary = VerificationSummary::from_results(vec![
            in_family("size", "a", true),
            in_family("mode", "b", false),
            in_family("size", "c", false),
            in_family("mode", "d", true),
        ]);
        let tallies = summary.by_family();
        assert_eq!(
            tallies,
            [
                FamilyTally { family: "mode".into(), passed: 1, failed: 1 },
                FamilyTally { family: "size".into(), passed: 1, failed: 1 },
            ]
        );
    }
}
