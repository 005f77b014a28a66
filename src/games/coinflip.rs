//! Coinflip Reproduction
//!
//! Player-versus-player: both seeds enter the message, pipe-separated, so
//! neither side can steer the flip alone. The low bit of the first digest
//! byte decides the coin.

use serde::{Deserialize, Serialize};

use super::{GameOutcome, Reproduction, ReproduceError};
use crate::core::hash::hmac_sha256;
use crate::history::round::CoinflipRound;

/// The two faces of the coin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoinSide {
    Heads,
    Tails,
}

impl CoinSide {
    /// Bit 0 heads, bit 1 tails.
    pub fn from_bit(bit: u8) -> Self {
        if bit & 1 == 0 {
            CoinSide::Heads
        } else {
            CoinSide::Tails
        }
    }
}

impl std::fmt::Display for CoinSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoinSide::Heads => write!(f, "heads"),
            CoinSide::Tails => write!(f, "tails"),
        }
    }
}

/// Re-derive a coinflip round from the revealed seed.
///
/// The message is `creatorSeed|joinerSeed|nonce`. Seed order is part of the
/// protocol: swapping them produces a different digest, so the creator's
/// seed always comes first.
pub fn reproduce(
    round: &CoinflipRound,
    seed_key: &[u8; 32],
) -> Result<Reproduction, ReproduceError> {
    let message = format!(
        "{}|{}|{}",
        round.common.client_seed, round.opponent_seed, round.common.nonce
    );
    let digest = hmac_sha256(seed_key, message.as_bytes());
    Ok(Reproduction {
        outcome: GameOutcome::Coinflip {
            outcome: CoinSide::from_bit(digest[0]),
        },
        first_hmac_hex: hex::encode(digest),
    })
}

// =============================================================================
// TESTS
// =============================================================================
