//! Verification: verdict taxonomy, the per-round orchestrator, and the
//! manual dispute panel.
//!
//! Nothing here persists state. Verdicts are recomputed on every fetch so a
//! round that was pending yesterday simply verifies today once its seed is
//! revealed.

pub mod engine;
pub mod manual;
pub mod verdict;

pub use engine::{verify_round, verify_rounds, VERIFY_FAN_OUT};
pub use manual::{run_manual_check, ManualCheck, ManualReport};
pub use verdict::{VerifyStatus, PENDING_REASON};
