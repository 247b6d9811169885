//! Diff rendering for fixture comparison.

use std::fmt::Write;

/// Render a line diff between expected and actual output.
///
/// Lines present on only one side are reported against an empty counterpart.
#[must_use]
pub fn render_diff(expected: &str, actual: &str) -> String {
    if expected == actual {
        return String::from("[identical]");
    }

    let mut out = String::from("--- expected\n+++ actual\n");
    let expected_lines: Vec<&str> = expected.lines().collect();
    let actual_lines: Vec<&str> = actual.lines().collect();
    let rows = expected_lines.len().max(actual_lines.len()).max(1);
    for i in 0..rows {
        let e = expected_lines.get(i).copied().unwrap_or("");
        let a = actual_lines.get(i).copied().unwrap_or("");
        if e != a {
            let _ = writeln!(out, "@@ line {} @@", i + 1);
            let _ = writeln!(out, "-{e}");
            let _ = writeln!(out, "+{a}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_inputs_are_marked() {
        assert_eq!(render_diff("a\nb", "a\nb"), "[identical]");
    }

    #[test]
    fn changed_line_is_reported_with_position() {
        let diff = render_diff("a\nb\nc", "a\nx\nc");
        assert!(diff.contains("@@ line 2 @@"));
        assert!(diff.contains("-b\n+x\n"));
        assert!(!diff.contains("line 1"));
    }

    #[test]
    fn extra_actual_line_is_reported() {
        let diff = render_diff("a", "a\nb");
        assert!(diff.contains("@@ line 2 @@\n-\n+b\n"));
    }

    #[test]
    fn empty_expected_is_still_a_diff() {
        let diff = render_diff("", "EINVAL");
        assert!(diff.contains("+EINVAL"));
    }
}
