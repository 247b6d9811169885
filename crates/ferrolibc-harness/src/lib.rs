//! Conformance testing harness for ferrolibc.
//!
//! This crate provides:
//! - Fixture loading: JSON reference cases grouped by function family
//! - Execution: dispatch a named call with JSON inputs into `ferrolibc-core`
//! - Verification: compare rendered outputs and errno against expectations
//! - Structured logging: JSONL records and artifact indexes for each run
//! - Report generation: human-readable + machine-readable conformance reports

#![forbid(unsafe_code)]

pub mod diff;
pub mod execute;
pub mod fixtures;
pub mod report;
pub mod runner;
pub mod structured_log;
pub mod verify;

pub use execute::{Execution, execute_case};
pub use fixtures::{FixtureCase, FixtureSet};
pub use report::ConformanceReport;
pub use runner::TestRunner;
pub use verify::{FamilyTally, VerificationResult, VerificationSummary};

/// Errors raised while loading, executing, or reporting fixtures.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown function `{0}`")]
    UnknownFunction(String),
    #[error("{function}: bad input `{field}`: {reason}")]
    BadInput {
        function: String,
        field: &'static str,
        reason: String,
    },
}
