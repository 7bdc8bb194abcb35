//! Processing outcomes.
//!
//! Files are independent units; the delivery is the unit of
//! acknowledgment. Per-file outcomes aggregate into one delivery
//! outcome that drives the ack decision.

use serde::{Deserialize, Serialize};

/// Result of processing a single media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileOutcome {
    /// The file already satisfies the language policy; nothing to do.
    Skipped,
    /// The file was remuxed and replaced in place.
    Remuxed,
    /// Inspection, remux, or replacement failed for this file.
    Failed,
}

/// Aggregate result of one delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOutcome {
    /// Every file was remuxed or cleanly skipped.
    AllHandled,
    /// Some files were remuxed, others failed.
    PartialFailure,
    /// No file was remuxed and not every file was a clean skip.
    HardFailure,
}

impl DeliveryOutcome {
    /// Aggregate per-file outcomes.
    ///
    /// An empty slice counts as `AllHandled`: nothing to do is a
    /// success, not a failure.
    pub fn from_files(outcomes: &[FileOutcome]) -> Self {
        let failed = outcomes.iter().any(|o| *o == FileOutcome::Failed);
        let remuxed = outcomes.iter().any(|o| *o == FileOutcome::Remuxed);

        if !failed {
            DeliveryOutcome::AllHandled
        } else if remuxed {
            DeliveryOutcome::PartialFailure
        } else {
            DeliveryOutcome::HardFailure
        }
    }

    /// Whether the delivery should be acknowledged and a completion
    /// message published.
    ///
    /// Partial failures still count: at least one file was fixed, and
    /// redelivering the whole work item would remux it again.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            DeliveryOutcome::AllHandled | DeliveryOutcome::PartialFailure
        )
    }
}

#[cfg(test)]
mod tests {
    use super::FileOutcome::*;
    use super::*;

    #[test]
    fn test_all_skipped_is_handled() {
        let outcome = DeliveryOutcome::from_files(&[Skipped, Skipped]);
        assert_eq!(outcome, DeliveryOutcome::AllHandled);
        assert!(outcome.is_success());
    }

    #[test]
    fn test_all_remuxed_is_handled() {
        let outcome = DeliveryOutcome::from_files(&[Remuxed, Remuxed]);
        assert_eq!(outcome, DeliveryOutcome::AllHandled);
        assert!(outcome.is_success());
    }

    #[test]
    fn test_remuxed_and_failed_is_partial() {
        let outcome = DeliveryOutcome::from_files(&[Remuxed, Failed]);
        assert_eq!(outcome, DeliveryOutcome::PartialFailure);
        assert!(outcome.is_success());
    }

    #[test]
    fn test_all_failed_is_hard_failure() {
        let outcome = DeliveryOutcome::from_files(&[Failed, Failed]);
        assert_eq!(outcome, DeliveryOutcome::HardFailure);
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_skip_and_failure_without_remux_is_hard_failure() {
        // A clean skip does not excuse the failed file: nothing was
        // fixed, so the delivery stays redeliverable.
        let outcome = DeliveryOutcome::from_files(&[Skipped, Failed]);
        assert_eq!(outcome, DeliveryOutcome::HardFailure);
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_no_files_is_handled() {
        let outcome = DeliveryOutcome::from_files(&[]);
        assert_eq!(outcome, DeliveryOutcome::AllHandled);
        assert!(outcome.is_success());
    }
}
