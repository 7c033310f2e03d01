//! Status counts over a set of records

use serde::Serialize;

use crate::status::{CanonicalStatus, normalize_str};

/// Per-bucket record counts
///
/// `total` counts every record; records whose status matches no synonym set
/// land in `unclassified` only, so the three named buckets can sum to less
/// than `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub available: u64,
    pub unavailable: u64,
    pub checked_out: u64,
    pub unclassified: u64,
    pub total: u64,
}

impl StatusSummary {
    /// Count one stored status value
    pub fn record(&mut self, status: &str) {
        match normalize_str(status) {
            CanonicalStatus::Available => self.available += 1,
            CanonicalStatus::Unavailable => self.unavailable += 1,
            CanonicalStatus::CheckedOut => self.checked_out += 1,
            CanonicalStatus::Unclassified(_) => self.unclassified += 1,
        }
        self.total += 1;
    }

    /// Sum of the three named buckets
    pub fn classified(&self) -> u64 {
        self.available + self.unavailable + self.checked_out
    }
}

/// Summarize stored status values
pub fn summarize<I, S>(statuses: I) -> StatusSummary
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    statuses
        .into_iter()
        .fold(StatusSummary::default(), |mut summary, status| {
            summary.record(status.as_ref());
            summary
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unclassified_records_only_count_toward_total() {
        let summary = summarize(["OK", "defeito", "cautelado", "banana"]);
        assert_eq!(summary.available, 1);
        assert_eq!(summary.unavailable, 1);
        assert_eq!(summary.checked_out, 1);
        assert_eq!(summary.unclassified, 1);
        assert_eq!(summary.total, 4);
        assert_ne!(summary.classified(), summary.total);
        assert_eq!(summary.classified() + summary.unclassified, summary.total);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(summarize(Vec::<String>::new()), StatusSummary::default());
    }

    #[test]
    fn test_normalized_and_raw_values_share_buckets() {
        let summary = summarize(["AVAILABLE", "livre", " CHECKED_OUT ", "Manutenção", ""]);
        assert_eq!(summary.available, 3);
        assert_eq!(summary.checked_out, 1);
        assert_eq!(summary.unavailable, 1);
        assert_eq!(summary.total, 5);
    }
}
