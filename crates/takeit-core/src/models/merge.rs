//! Merge and multi-step outcome models

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Policy applied when the same record exists on both sides of a merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictStrategy {
    /// The live store wins
    KeepCurrent,
    /// The backup wins
    KeepBackup,
    /// The side with the larger `modified_time` wins
    #[default]
    KeepNewer,
}

impl ConflictStrategy {
    pub const ALL: [Self; 3] = [Self::KeepCurrent, Self::KeepBackup, Self::KeepNewer];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::KeepCurrent => "keep-current",
            Self::KeepBackup => "keep-backup",
            Self::KeepNewer => "keep-newer",
        }
    }
}

impl fmt::Display for ConflictStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown conflict strategy: {s}"))
    }
}

/// Outcome of resolving a single conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    KeepExisting,
    TakeIncoming,
}

/// Terminal outcome of one merge invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeResult {
    pub success: bool,
    /// Human-readable summary, suitable for direct display
    pub message: String,
    pub merged_notes: usize,
    pub merged_tags: usize,
    pub merged_associations: usize,
    pub conflicts: usize,
}

impl MergeResult {
    /// A completed merge with its counts
    #[must_use]
    pub fn completed(
        merged_notes: usize,
        merged_tags: usize,
        merged_associations: usize,
        conflicts: usize,
    ) -> Self {
        Self {
            success: true,
            message: format!(
                "Merge complete: {merged_notes} notes, {merged_tags} tags, {conflicts} conflicts"
            ),
            merged_notes,
            merged_tags,
            merged_associations,
            conflicts,
        }
    }

    /// A failed merge carrying the cause
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            merged_notes: 0,
            merged_tags: 0,
            merged_associations: 0,
            conflicts: 0,
        }
    }
}

/// One failed step of a best-effort operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFailure {
    /// What the step acted on (a file name, or a step label)
    pub target: String,
    pub reason: String,
}

/// Outcome of an operation that keeps going after individual steps fail
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialOutcome {
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<StepFailure>,
}

impl PartialOutcome {
    pub fn record_success(&mut self) {
        self.attempted += 1;
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, target: impl Into<String>, reason: impl ToString) {
        self.attempted += 1;
        self.failures.push(StepFailure {
            target: target.into(),
            reason: reason.to_string(),
        });
    }

    /// True when every attempted step succeeded
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parse_round_trip() {
        for strategy in ConflictStrategy::ALL {
            assert_eq!(strategy.as_str().parse::<ConflictStrategy>(), Ok(strategy));
        }
        assert_eq!("KEEP-NEWER".parse(), Ok(ConflictStrategy::KeepNewer));
        assert!("newest".parse::<ConflictStrategy>().is_err());
    }

    #[test]
    fn test_merge_result_message() {
        let result = MergeResult::completed(2, 1, 3, 1);
        assert!(result.success);
        assert_eq!(result.message, "Merge complete: 2 notes, 1 tags, 1 conflicts");

        let failed = MergeResult::failed("boom");
        assert!(!failed.success);
        assert_eq!(failed.conflicts, 0);
    }

    #[test]
    fn test_partial_outcome_tracks_failures() {
        let mut outcome = PartialOutcome::default();
        outcome.record_success();
        outcome.record_failure("a.db", "permission denied");
        assert_eq!(outcome.attempted, 2);
        assert_eq!(outcome.succeeded, 1);
        assert!(!outcome.is_complete());
        assert_eq!(outcome.failures[0].target, "a.db");
    }
}
