//! Drain outcomes: the success summary and the timeout diagnostic.

use std::fmt;
use std::time::Duration;

/// Successful drain summary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Drained {
    /// Time from the first poll until stability was confirmed.
    pub elapsed: Duration,
    /// Number of registry polls performed.
    pub polls: u64,
}

/// Diagnostic attached to a drain timeout.
///
/// The three snapshots identify which named operations stalled: a label present in
/// all of them never finished; a label missing from `after_grace` completed late.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Label of the drain (usually the batch name).
    pub label: String,
    /// Configured overall timeout.
    pub timeout: Duration,
    /// Grace period waited after the timeout.
    pub grace: Duration,
    /// Outstanding labels at the first poll.
    pub initial: Vec<String>,
    /// Outstanding labels when the timeout fired.
    pub at_timeout: Vec<String>,
    /// Outstanding labels after the grace period.
    pub after_grace: Vec<String>,
}

impl DrainReport {
    /// Labels still outstanding after the grace period.
    pub fn stalled(&self) -> &[String] {
        &self.after_grace
    }

    /// Labels that were outstanding at the timeout but finished during the grace period.
    pub fn recovered_during_grace(&self) -> Vec<&str> {
        self.at_timeout
            .iter()
            .filter(|l| !self.after_grace.contains(l))
            .map(String::as_str)
            .collect()
    }
}

impl fmt::Display for DrainReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if self.label.is_empty() {
            "<unnamed>"
        } else {
            &self.label
        };
        writeln!(
            f,
            "drain {name} timed out after {:?} (+{:?} grace)",
            self.timeout, self.grace
        )?;
        writeln!(f, "  initial:     [{}]", self.initial.join(", "))?;
        writeln!(f, "  at timeout:  [{}]", self.at_timeout.join(", "))?;
        write!(f, "  after grace: [{}]", self.after_grace.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn renders_all_three_snapshots() {
        let report = DrainReport {
            label: "sheet-sync".into(),
            timeout: Duration::from_secs(5),
            grace: Duration::from_secs(2),
            initial: labels(&["read_a", "read_b"]),
            at_timeout: labels(&["read_b"]),
            after_grace: labels(&["read_b"]),
        };
        let text = report.to_string();
        assert!(text.starts_with("drain sheet-sync timed out after 5s (+2s grace)"));
        assert!(text.contains("initial:     [read_a, read_b]"));
        assert!(text.contains("after grace: [read_b]"));
        assert_eq!(report.stalled(), &["read_b".to_string()]);
    }

    #[test]
    fn late_completions_are_recovered() {
        let report = DrainReport {
            at_timeout: labels(&["a", "b", "c"]),
            after_grace: labels(&["b"]),
            ..DrainReport::default()
        };
        assert_eq!(report.recovered_during_grace(), vec!["a", "c"]);
        assert!(report.to_string().starts_with("drain <unnamed>"));
    }
}
