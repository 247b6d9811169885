//! Fixture loading and management.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::HarnessError;

/// A single fixture test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureCase {
    /// Case identifier.
    pub name: String,
    /// Function being tested, as dispatched by [`crate::execute_case`].
    pub function: String,
    /// Standard or manual page the expectation comes from.
    #[serde(default)]
    pub reference: String,
    /// Input parameters.
    pub inputs: serde_json::Value,
    /// Expected output, rendered the way the executor renders results.
    pub expected_output: String,
    /// Expected errno after the call; zero for success.
    #[serde(default)]
    pub expected_errno: i32,
}

/// A collection of fixture cases for a function family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Schema version.
    pub version: String,
    /// Function family name.
    pub family: String,
    /// UTC timestamp of capture.
    pub captured_at: String,
    /// Individual test cases.
    pub cases: Vec<FixtureCase>,
}

impl FixtureSet {
    /// Load fixture set from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize fixture set to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load fixture set from a file path.
    pub fn from_file(path: &Path) -> Result<Self, HarnessError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    /// Load every `*.json` fixture set in `dir`, sorted by file name.
    ///
    /// A path naming a single file loads just that file.
    pub fn load_all(dir: &Path) -> Result<Vec<(PathBuf, Self)>, HarnessError> {
        if dir.is_file() {
            return Ok(vec![(dir.to_path_buf(), Self::from_file(dir)?)]);
        }
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("json"))
            .collect();
        paths.sort();

        paths
            .into_iter()
            .map(|path| {
                let set = Self::from_file(&path)?;
                Ok((path, set))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_optional_fields_take_defaults() {
        let set = FixtureSet::from_json(
            r#"{
                "version":"v1",
                "family":"path",
                "captured_at":"2026-10-01T00:00:00Z",
                "cases":[
                    {"name":"dot","function":"cleanname","inputs":{"path":"."},"expected_output":"."}
                ]
            }"#,
        )
        .expect("valid fixture json");
        assert_eq!(set.cases.len(), 1);
        assert_eq!(set.cases[0].expected_errno, 0);
        assert!(set.cases[0].reference.is_empty());
    }

    #[test]
    fn json_round_trip_keeps_cases() {
        let set = FixtureSet {
            version: String::from("v1"),
            family: String::from("size"),
            captured_at: String::from("2026-10-01T00:00:00Z"),
            cases: vec![FixtureCase {
                name: String::from("kib"),
                function: String::from("machinesize"),
                reference: String::from("IEC 80000-13"),
                inputs: serde_json::json!({"s": "1KiB"}),
                expected_output: String::from("1024"),
                expected_errno: 0,
            }],
        };
        let json = set.to_json().expect("serializes");
        let back = FixtureSet::from_json(&json).expect("parses");
        assert_eq!(back.family, "size");
        assert_eq!(back.cases[0].inputs["s"], "1KiB");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = FixtureSet::from_file(Path::new("/nonexistent/ferrolibc/fixture.json"))
            .expect_err("missing file");
        assert!(matches!(err, HarnessError::Io(_)));
    }
}
