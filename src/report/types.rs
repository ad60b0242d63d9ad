use serde::Serialize;

use crate::resolver::{QueryStatus, Resolution};

/// Output format for a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Terminal,
    Json,
}

/// Counts across all resolutions in a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub resolved: usize,
    pub failed: usize,
    pub invalid: usize,
}

/// Complete report, one entry per input in input order.
#[derive(Debug, Serialize)]
pub struct Report {
    pub resolutions: Vec<Resolution>,
    pub summary: Summary,
}

impl Report {
    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0 || self.summary.invalid > 0
    }
}

impl Summary {
    pub fn record(&mut self, resolution: &Resolution) {
        if resolution.invalid_reason.is_some() {
            self.invalid += 1;
            return;
        }
        match resolution.status {
            QueryStatus::Success => self.resolved += 1,
            QueryStatus::Error => self.failed += 1,
            QueryStatus::Idle | QueryStatus::Loading => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_invalid_separately() {
        let mut summary = Summary::default();
        summary.record(&Resolution::idle());
        assert_eq!(summary, Summary::default());

        let invalid = Resolution {
            invalid_reason: Some(crate::resolver::InvalidReason::EmptyUrl),
            ..Resolution::idle()
        };
        summary.record(&invalid);
        assert_eq!(summary.invalid, 1);
        assert_eq!(summary.failed, 0);
    }
}
