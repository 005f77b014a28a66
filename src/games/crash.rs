//! Crash Multiplier Reproduction
//!
//! Single digest per round, same `clientSeed + nonce` message as dice, but
//! the bust point needs more entropy than a die roll: the first 8 digest
//! bytes feed a 53-bit uniform draw through the standard inverse-CDF curve
//! `0.99 / (1 - r)`, floored at 1.01x and capped at 10000x.

use super::{GameOutcome, Reproduction, ReproduceError};
use crate::core::hash::{digest_u64_be, hmac_sha256, Digest32};
use crate::history::round::CrashRound;

/// House edge applied to the curve.
pub const HOUSE_EDGE: f64 = 0.99;
/// Every round pays at least this much to a cash-out at the floor.
pub const MIN_MULTIPLIER: f64 = 1.01;
/// Hard ceiling on the bust point.
pub const MAX_MULTIPLIER: f64 = 10_000.0;
/// Stored and recomputed multipliers may differ by float round-off across
/// runtimes; anything within this combined tolerance counts as equal.
pub const MULTIPLIER_TOLERANCE: f64 = 1e-9;

const R_CLAMP: f64 = 0.999999999999;
const TWO_POW_53: f64 = 9_007_199_254_740_992.0;

/// Uniform draw in `[0, 1)` from the top 53 bits of the digest's leading
/// 8 bytes. 53 bits is the full f64 mantissa, so the division is exact.
#[inline]
pub fn uniform_from_digest(digest: &Digest32) -> f64 {
    (digest_u64_be(digest) >> 11) as f64 / TWO_POW_53
}

/// Bust multiplier for a uniform draw.
///
/// `r` is clamped below 1 before the division so the curve never produces
/// infinity; the cap keeps degenerate draws at a payable ceiling.
pub fn multiplier_from_uniform(r: f64) -> f64 {
    let m = (HOUSE_EDGE / (1.0 - r.min(R_CLAMP))).max(MIN_MULTIPLIER);
    m.min(MAX_MULTIPLIER)
}

/// Compare a recomputed multiplier against the stored one.
///
/// Combined absolute and relative tolerance: the scale floor of 1.0 makes
/// the comparison absolute near the 1.01x floor and relative for large
/// multipliers.
pub fn multipliers_match(computed: f64, stored: f64) -> bool {
    let scale = computed.abs().max(stored.abs()).max(1.0);
    (computed - stored).abs() <= MULTIPLIER_TOLERANCE * scale
}

/// Re-derive a crash round from the revealed seed.
pub fn reproduce(round: &CrashRound, seed_key: &[u8; 32]) -> Result<Reproduction, ReproduceError> {
    let message = format!("{}{}", round.common.client_seed, round.common.nonce);
    let digest = hmac_sha256(seed_key, message.as_bytes());
    let multiplier = multiplier_from_uniform(uniform_from_digest(&digest));
    Ok(Reproduction {
        outcome: GameOutcome::Crash { multiplier },
        first_hmac_hex: hex::encode(digest),
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::encode::decode_server_seed;
    use crate::history::round::test_support::{crash_round, SEED_HEX};
    use proptest::prelude::*;

    fn seed_key() -> [u8; 32] {
        decode_server_seed(SEED_HEX).unwrap()
    }

    #[test]
    fn test_known_multipliers() {
        // These values must never change!
        let rep = reproduce(&crash_round("abc", 2, 4.97), &seed_key()).unwrap();
        assert_eq!(
            rep.first_hmac_hex,
            "cd1285ae91595d81f2fe8e25dd0618e260e2cfc6b8af1b0fcdcb2566c11b9428"
        );
        assert_eq!(
            rep.outcome,
            GameOutcome::Crash {
                multiplier: 4.976471750911273
            }
        );

        let rep = reproduce(&crash_round("abc", 11, 16.68), &seed_key()).unwrap();
        assert_eq!(
            rep.first_hmac_hex,
            "f0ce49c14dde42e9efbbc9dd73a328e627726d96341e01097fa73448f5fc29dc"
        );
        assert_eq!(
            rep.outcome,
            GameOutcome::Crash {
                multiplier: 16.680063142304043
            }
        );
    }

    #[test]
    fn test_zero_draw_hits_floor() {
        assert_eq!(multiplier_from_uniform(0.0), MIN_MULTIPLIER);
    }

    #[test]
    fn test_degenerate_draw_hits_cap() {
        // r above the clamp would divide by ~1e-12 without the cap
        assert_eq!(multiplier_from_uniform(0.9999999999999), MAX_MULTIPLIER);
        assert_eq!(multiplier_from_uniform(1.0), MAX_MULTIPLIER);
    }

    #[test]
    fn test_all_zero_digest_is_floor() {
        let digest = [0u8; 32];
        assert_eq!(uniform_from_digest(&digest), 0.0);
        assert_eq!(multiplier_from_uniform(0.0), MIN_MULTIPLIER);
    }

    #[test]
    fn test_tolerance_accepts_round_off() {
        assert!(multipliers_match(4.976471750911273, 4.976471750911273));
        assert!(multipliers_match(4.976471750911273, 4.976471750911274));
        assert!(!multipliers_match(4.976471750911273, 4.9764718));
        // Relative at large scale: 1e-6 apart at 10000x still matches
        assert!(multipliers_match(10_000.0, 10_000.000001));
    }

    proptest! {
        #[test]
        fn prop_multiplier_in_payable_range(r in 0.0f64..1.0) {
            let m = multiplier_from_uniform(r);
            prop_assert!((MIN_MULTIPLIER..=MAX_MULTIPLIER).contains(&m));
        }

        #[test]
        fn prop_curve_is_monotonic(a in 0.0f64..1.0, b in 0.0f64..1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            // Non-strict: the floor and cap flatten the ends of the curve
            prop_assert!(multiplier_from_uniform(lo) <= multiplier_from_uniform(hi));
        }
    }
}
