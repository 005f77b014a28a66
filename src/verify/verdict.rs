//! Verdict Taxonomy
//!
//! Every fetched round resolves to exactly one of four verdicts. A mismatch
//! is a finding, not a fault: it is never retried, and it carries the full
//! list of failed comparisons plus the recomputed values so a dispute can be
//! settled from the row alone.

use serde::Serialize;

use crate::games::GameOutcome;

/// Reason attached to pending verdicts while the seed is unrevealed.
pub const PENDING_REASON: &str = "Waiting for server seed reveal";

/// Four-way classification of one round's verification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerifyStatus {
    /// Every derivable field matched the stored record.
    Verified,
    /// Server seed not yet revealed; expected steady state, retried on the
    /// next fetch.
    Pending { reason: String },
    /// The revealed seed reproduces different values than the record stores.
    Mismatch {
        details: String,
        computed: GameOutcome,
    },
    /// Verification itself failed on malformed data.
    Error { details: String },
}

impl VerifyStatus {
    /// Pending with the standard reveal-wait reason.
    pub fn pending() -> Self {
        VerifyStatus::Pending {
            reason: PENDING_REASON.to_string(),
        }
    }

    /// Check if every comparison passed.
    pub fn is_verified(&self) -> bool {
        matches!(self, VerifyStatus::Verified)
    }

    /// Check if the round is still waiting on a seed reveal.
    pub fn is_pending(&self) -> bool {
        matches!(self, VerifyStatus::Pending { .. })
    }

    /// Check if the stored record disagrees with the recomputation.
    pub fn is_mismatch(&self) -> bool {
        matches!(self, VerifyStatus::Mismatch { .. })
    }

    /// Check if verification failed to run at all.
    pub fn is_error(&self) -> bool {
        matches!(self, VerifyStatus::Error { .. })
    }

    /// Short label for table rendering. Mismatches shout.
    pub fn label(&self) -> &'static str {
        match self {
            VerifyStatus::Verified => "verified",
            VerifyStatus::Pending { .. } => "pending",
            VerifyStatus::Mismatch { .. } => "MISMATCH",
            VerifyStatus::Error { .. } => "error",
        }
    }
}

/// Accumulates failed comparisons for one round.
///
/// All checks run even after one fails; a mismatch verdict reports every
/// disagreement, never just the first.
#[derive(Debug, Default)]
pub(crate) struct Checks {
    failures: Vec<String>,
}

impl Checks {
    /// Record a failure unless `passed`. The detail closure only runs on
    /// failure, keeping the verified path allocation-free.
    pub fn expect<F>(&mut self, passed: bool, detail: F)
    where
        F: FnOnce() -> String,
    {
        if !passed {
            self.failures.push(detail());
        }
    }

    /// Exact-equality check with a standard stored/computed detail line.
    pub fn expect_eq<T>(&mut self, name: &str, stored: &T, computed: &T)
    where
        T: PartialEq + std::fmt::Display,
    {
        if stored != computed {
            self.failures
                .push(format!("{name}: stored {stored}, computed {computed}"));
        }
    }

    /// Collapse into a verdict, attaching the recomputed outcome on
    /// mismatch.
    pub fn into_status(self, computed: GameOutcome) -> VerifyStatus {
        if self.failures.is_empty() {
            VerifyStatus::Verified
        } else {
            VerifyStatus::Mismatch {
                details: self.failures.join("; "),
                computed,
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn dice_outcome() -> GameOutcome {
        GameOutcome::Dice { roll: 36, win: true }
    }

    #[test]
    fn test_empty_checks_verify() {
        let checks = Checks::default();
        assert_eq!(checks.into_status(dice_outcome()), VerifyStatus::Verified);
    }

    #[test]
    fn test_failures_join_in_order() {
        let mut checks = Checks::default();
        checks.expect_eq("roll", &41u8, &36u8);
        checks.expect(false, || "second failure".to_string());
        checks.expect(true, || unreachable!("detail must not run on success"));

        match checks.into_status(dice_outcome()) {
            VerifyStatus::Mismatch { details, .. } => {
                assert_eq!(details, "roll: stored 41, computed 36; second failure");
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(VerifyStatus::Verified.label(), "verified");
        assert_eq!(VerifyStatus::pending().label(), "pending");
        assert_eq!(
            VerifyStatus::Error {
                details: "x".into()
            }
            .label(),
            "error"
        );
    }

    #[test]
    fn test_serde_tag_shape() {
        let json = serde_json::to_value(VerifyStatus::pending()).unwrap();
        assert_eq!(json["kind"], "pending");
        assert_eq!(json["reason"], PENDING_REASON);
    }
}
