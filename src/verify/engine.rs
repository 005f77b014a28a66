//! Verification Orchestrator
//!
//! Drives one round from stored record to verdict: decode the revealed
//! seed, re-derive the outcome, compare every derivable field. Rounds are
//! independent of each other by construction, so the batch path fans out
//! across blocking workers and reassembles results in input order.

use futures_util::{stream, StreamExt};
use tracing::{debug, warn};

use super::verdict::{Checks, VerifyStatus};
use crate::core::encode::decode_server_seed;
use crate::core::hash::seed_commitment_hex;
use crate::games::{self, crash, slots, GameOutcome, Reproduction, ReproduceError};
use crate::history::round::ResolvedRound;

/// Concurrent verifications in flight per batch.
pub const VERIFY_FAN_OUT: usize = 16;

/// Verify one round end to end.
///
/// Pure with respect to its inputs and never panics on malformed records:
/// anything that fails to decode becomes an error verdict on this row and
/// nothing else.
pub fn verify_round(round: &ResolvedRound) -> VerifyStatus {
    let common = round.common();
    let seed_hex = match common.server_seed_hex.as_deref() {
        // Absent or empty means the seed is simply not revealed yet
        None | Some("") => return VerifyStatus::pending(),
        Some(s) => s,
    };

    match compute_verdict(round, seed_hex) {
        Ok(status) => {
            if let VerifyStatus::Mismatch { details, .. } = &status {
                warn!(
                    game = %round.kind(),
                    player = %common.player,
                    nonce = common.nonce,
                    %details,
                    "round failed verification"
                );
            }
            status
        }
        Err(err) => {
            debug!(
                game = %round.kind(),
                nonce = common.nonce,
                error = %err,
                "round not verifiable"
            );
            VerifyStatus::Error {
                details: err.to_string(),
            }
        }
    }
}

fn compute_verdict(
    round: &ResolvedRound,
    seed_hex: &str,
) -> Result<VerifyStatus, ReproduceError> {
    let seed_key = decode_server_seed(seed_hex)?;
    let reproduction = games::reproduce(round, &seed_key)?;
    let common = round.common();
    let mut checks = Checks::default();

    // The seed must hash back to the commitment players saw up front
    let commitment = seed_commitment_hex(seed_hex);
    checks.expect(commitment == common.server_seed_hash, || {
        format!(
            "seed commitment: stored {}, computed {}",
            common.server_seed_hash, commitment
        )
    });

    // Plinko matches the digest against both generations itself
    if !matches!(round, ResolvedRound::Plinko(_)) {
        checks.expect(reproduction.first_hmac_hex == common.first_hmac_hex, || {
            format!(
                "first hmac: stored {}, computed {}",
                common.first_hmac_hex, reproduction.first_hmac_hex
            )
        });
    }

    compare_game_fields(round, &reproduction, &mut checks);
    Ok(checks.into_status(reproduction.outcome))
}

fn win_word(win: bool) -> &'static str {
    if win {
        "win"
    } else {
        "loss"
    }
}

fn compare_game_fields(round: &ResolvedRound, reproduction: &Reproduction, checks: &mut Checks) {
    match (round, &reproduction.outcome) {
        (ResolvedRound::Dice(r), GameOutcome::Dice { roll, win }) => {
            checks.expect_eq("roll", &r.roll, roll);
            let stored_win = r.common.payout_lamports > 0;
            checks.expect(*win == stored_win, || {
                format!(
                    "winning side: stored {}, computed {}",
                    win_word(stored_win),
                    win_word(*win)
                )
            });
        }
        (ResolvedRound::Coinflip(r), GameOutcome::Coinflip { outcome }) => {
            checks.expect_eq("outcome", &r.outcome, outcome);
        }
        (ResolvedRound::Crash(r), GameOutcome::Crash { multiplier }) => {
            checks.expect(crash::multipliers_match(*multiplier, r.multiplier), || {
                format!(
                    "multiplier: stored {}, computed {multiplier}",
                    r.multiplier
                )
            });
        }
        (ResolvedRound::Mines(r), GameOutcome::Mines { bombs, payout_lamports }) => {
            if let Some(stored) = &r.bomb_indices {
                let mut stored_sorted = stored.clone();
                stored_sorted.sort_unstable();
                checks.expect(stored_sorted == *bombs, || {
                    format!("bomb layout: stored {stored_sorted:?}, computed {bombs:?}")
                });
            }
            let hits: Vec<u8> = r
                .opened
                .iter()
                .copied()
                .filter(|tile| bombs.contains(tile))
                .collect();
            checks.expect(hits.is_empty(), || {
                format!("opened tiles hit computed bombs: {hits:?}")
            });
            // Only cashed-out rounds store a payout worth comparing
            if r.common.payout_lamports > 0 {
                checks.expect_eq("payout lamports", &r.common.payout_lamports, payout_lamports);
            }
        }
        (
            ResolvedRound::Slots(r),
            GameOutcome::Slots {
                outcome_key,
                grid,
                payout_lamports,
            },
        ) => {
            if let Some(stored_key) = &r.outcome_key {
                checks.expect(stored_key == outcome_key, || {
                    format!("outcome key: stored {stored_key}, computed {outcome_key}")
                });
            }
            if let Some(stored_grid) = &r.grid {
                checks.expect(stored_grid == grid, || {
                    format!(
                        "grid: stored [{}], computed [{}]",
                        slots::grid_text(stored_grid),
                        slots::grid_text(grid)
                    )
                });
            }
            checks.expect_eq("payout lamports", &r.common.payout_lamports, payout_lamports);
        }
        (
            ResolvedRound::Plinko(r),
            GameOutcome::Plinko {
                scheme,
                landing_slots,
            },
        ) => {
            if scheme.is_none() {
                checks.expect(false, || {
                    format!(
                        "first hmac matches neither generation: stored {}, computed v2 {}",
                        r.common.first_hmac_hex, reproduction.first_hmac_hex
                    )
                });
            } else if let (Some(stored), Some(computed)) = (&r.landing_slots, landing_slots) {
                checks.expect(stored == computed, || {
                    format!("landing slots: stored {stored:?}, computed {computed:?}")
                });
            }
        }
        // The dispatcher pairs variants by construction
        _ => checks.expect(false, || {
            "outcome variant does not match round game".to_string()
        }),
    }
}

/// Verify a batch concurrently with bounded fan-out, preserving input order.
///
/// Each round runs on a blocking worker since the work is pure CPU. A row
/// that fails entirely (worker panic) degrades to an error verdict; it never
/// takes the batch down with it.
pub async fn verify_rounds(rounds: Vec<ResolvedRound>) -> Vec<(ResolvedRound, VerifyStatus)> {
    let tasks = rounds.into_iter().map(|round| async move {
        let fallback = round.clone();
        let handle = tokio::task::spawn_blocking(move || {
            let status = verify_round(&round);
            (round, status)
        });
        match handle.await {
            Ok(pair) => pair,
            Err(err) => (
                fallback,
                VerifyStatus::Error {
                    details: format!("verification task failed: {err}"),
                },
            ),
        }
    });
    stream::iter(tasks)
        .buffered(VERIFY_FAN_OUT)
        .collect()
        .await
}

// =============================================================================
// TESTS
// =============================================================================
