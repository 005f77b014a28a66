//! Plinko Reproduction
//!
//! Two protocol generations are live in stored history. The current "v2"
//! rounds were resolved through the counter stream, so their first HMAC
//! message carries the counter-0 suffix (4 zero bytes); legacy "v1" rounds
//! used the bare `clientSeed + nonce` message. Both candidates are computed
//! and whichever matches the stored digest decides the round's generation.

use serde::{Deserialize, Serialize};

use super::{GameOutcome, Reproduction, ReproduceError};
use crate::core::hash::hmac_sha256;
use crate::core::rng::HmacRng;
use crate::history::round::PlinkoRound;

/// Message generation a stored round was resolved under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlinkoScheme {
    /// Legacy: bare `clientSeed + nonce` message, no landing-slot replay.
    V1,
    /// Current: counter-stream message; landing slots are re-derivable.
    V2,
}

/// First-HMAC candidates for both generations, `(v1, v2)`.
pub fn candidate_hmacs(seed_key: &[u8; 32], client_seed: &str, nonce: u64) -> (String, String) {
    let mut message = Vec::new();
    message.extend_from_slice(client_seed.as_bytes());
    message.extend_from_slice(nonce.to_string().as_bytes());
    let v1 = hex::encode(hmac_sha256(seed_key, &message));

    // v2 is the same message with the counter-0 suffix
    message.extend_from_slice(&0u32.to_le_bytes());
    let v2 = hex::encode(hmac_sha256(seed_key, &message));

    (v1, v2)
}

/// Landing slot per ball: one left/right draw per peg row, slot index is
/// the count of rights. Only meaningful for v2 rounds; v1 history predates
/// the stream and cannot be replayed ball by ball.
pub fn derive_landing_slots(
    seed_key: &[u8; 32],
    client_seed: &str,
    nonce: u64,
    balls: u8,
    rows: u8,
) -> Vec<u8> {
    let mut rng = HmacRng::new(seed_key, client_seed, nonce);
    (0..balls)
        .map(|_| (0..rows).map(|_| rng.next_int(0, 1) as u8).sum())
        .collect()
}

/// Re-derive a plinko round from the revealed seed.
///
/// When neither candidate matches the stored digest, the scheme is left
/// unset and the verdict layer reports the mismatch; the v2 candidate is
/// surfaced as the computed value since it is the current generation.
pub fn reproduce(round: &PlinkoRound, seed_key: &[u8; 32]) -> Result<Reproduction, ReproduceError> {
    let (v1, v2) = candidate_hmacs(
        seed_key,
        &round.common.client_seed,
        round.common.nonce,
    );

    let stored = &round.common.first_hmac_hex;
    let (scheme, first_hmac_hex) = if *stored == v2 {
        (Some(PlinkoScheme::V2), v2)
    } else if *stored == v1 {
        (Some(PlinkoScheme::V1), v1)
    } else {
        (None, v2)
    };

    let landing_slots = match scheme {
        Some(PlinkoScheme::V2) => Some(derive_landing_slots(
            seed_key,
            &round.common.client_seed,
            round.common.nonce,
            round.balls,
            round.rows,
        )),
        _ => None,
    };

    Ok(Reproduction {
        outcome: GameOutcome::Plinko {
            scheme,
            landing_slots,
        },
        first_hmac_hex,
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::encode::decode_server_seed;
    use crate::history::round::test_support::{plinko_round, SEED_HEX};

    const V1_NONCE_5: &str = "d16d37d3b96f92e4d1243cb4c50b893777fd8432c4a2d0a148c9891461d73201";
    const V2_NONCE_5: &str = "9c3c3f226500e0969ee723f55950dd25f254d4c979f69def1a0755c7801649a1";

    fn seed_key() -> [u8; 32] {
        decode_server_seed(SEED_HEX).unwrap()
    }

    #[test]
    fn test_candidates_are_known_values() {
        let (v1, v2) = candidate_hmacs(&seed_key(), "abc", 5);
        // These values must never change!
        assert_eq!(v1, V1_NONCE_5);
        assert_eq!(v2, V2_NONCE_5);

        let (v1, v2) = candidate_hmacs(&seed_key(), "abc", 6);
        assert_eq!(
            v1,
            "fe87de740679c779e3f228c4c7191bd0cc64ff8f62bfd41f48ba706864aec5c4"
        );
        assert_eq!(
            v2,
            "f83787781f43cc6a3030b3af96fba2c9284f933c033f84e29fc016cfd6eb2d57"
        );
    }

    #[test]
    fn test_current_generation_replays_landing_slots() {
        let round = plinko_round("abc", 5, 3, 8, V2_NONCE_5);
        let rep = reproduce(&round, &seed_key()).unwrap();

        assert_eq!(rep.first_hmac_hex, V2_NONCE_5);
        assert_eq!(
            rep.outcome,
            GameOutcome::Plinko {
                scheme: Some(PlinkoScheme::V2),
                landing_slots: Some(vec![4, 5, 6]),
            }
        );
    }

    #[test]
    fn test_legacy_generation_matches_without_replay() {
        let round = plinko_round("abc", 5, 3, 8, V1_NONCE_5);
        let rep = reproduce(&round, &seed_key()).unwrap();

        assert_eq!(rep.first_hmac_hex, V1_NONCE_5);
        assert_eq!(
            rep.outcome,
            GameOutcome::Plinko {
                scheme: Some(PlinkoScheme::V1),
                landing_slots: None,
            }
        );
    }

    #[test]
    fn test_unmatched_digest_reports_current_candidate() {
        let round = plinko_round("abc", 5, 3, 8, "00ff00ff00ff");
        let rep = reproduce(&round, &seed_key()).unwrap();

        assert_eq!(rep.first_hmac_hex, V2_NONCE_5);
        assert_eq!(
            rep.outcome,
            GameOutcome::Plinko {
                scheme: None,
                landing_slots: None,
            }
        );
    }

    #[test]
    fn test_landing_slots_stay_on_the_board() {
        let slots = derive_landing_slots(&seed_key(), "board", 77, 16, 12);
        assert_eq!(slots.len(), 16);
        // A 12-row board has 13 landing slots, 0 through 12
        assert!(slots.iter().all(|&s| s <= 12));
    }
}
