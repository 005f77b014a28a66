//! Dice Roll Reproduction
//!
//! The oldest resolution chain: a single HMAC over `clientSeed + nonce`
//! (plain concatenation, no separators, no counter suffix), with the first
//! 4 digest bytes mapped big-endian onto `[1, 100]`.

use serde::{Deserialize, Serialize};

use super::{GameOutcome, Reproduction, ReproduceError};
use crate::core::hash::{digest_u32_be, hmac_sha256, Digest32};
use crate::history::round::DiceRound;

/// Number of faces on the virtual die; rolls span `1..=ROLL_RANGE`.
pub const ROLL_RANGE: u32 = 100;

/// Which side of the target the player bet on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiceBetType {
    /// Wins when the roll is strictly below the target.
    Under,
    /// Wins when the roll is strictly above the target.
    Over,
}

impl std::fmt::Display for DiceBetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiceBetType::Under => write!(f, "under"),
            DiceBetType::Over => write!(f, "over"),
        }
    }
}

/// Map an outcome digest onto a roll in `[1, 100]`.
#[inline]
pub fn roll_from_digest(digest: &Digest32) -> u8 {
    (digest_u32_be(digest) % ROLL_RANGE + 1) as u8
}

/// Winning side of a resolved roll. Equality with the target loses for both
/// bet types.
pub fn is_win(roll: u8, bet_type: DiceBetType, target: u8) -> bool {
    match bet_type {
        DiceBetType::Under => roll < target,
        DiceBetType::Over => roll > target,
    }
}

/// Re-derive a dice round from the revealed seed.
pub fn reproduce(round: &DiceRound, seed_key: &[u8; 32]) -> Result<Reproduction, ReproduceError> {
    let message = format!("{}{}", round.common.client_seed, round.common.nonce);
    let digest = hmac_sha256(seed_key, message.as_bytes());
    let roll = roll_from_digest(&digest);
    Ok(Reproduction {
        outcome: GameOutcome::Dice {
            roll,
            win: is_win(roll, round.bet_type, round.target),
        },
        first_hmac_hex: hex::encode(digest),
    })
}

// =============================================================================
// TESTS
// =============================================================================
