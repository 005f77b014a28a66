//! Per-Game Outcome Reproducers
//!
//! One module per game, each re-deriving the authoritative outcome from
//! `(serverSeed, clientSeed, nonce)` plus whatever extra inputs the game
//! binds (opponent seed, wallet address, board shape). The reproducers are
//! pure: same inputs, same outcome, no clock, no I/O.
//!
//! The message formats differ per game because they accreted over time on
//! the server side; this crate reproduces each one exactly rather than
//! unifying them, since any "cleanup" would break every historical round.

pub mod coinflip;
pub mod crash;
pub mod dice;
pub mod mines;
pub mod plinko;
pub mod slots;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::encode::DecodeError;
use crate::history::round::ResolvedRound;
use coinflip::CoinSide;
use plinko::PlinkoScheme;
use slots::SlotSymbol;

/// Closed set of supported games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    Dice,
    Coinflip,
    Crash,
    Mines,
    Slots,
    Plinko,
}

impl GameKind {
    /// Every supported game, in display order.
    pub const ALL: [GameKind; 6] = [
        GameKind::Dice,
        GameKind::Coinflip,
        GameKind::Crash,
        GameKind::Mines,
        GameKind::Slots,
        GameKind::Plinko,
    ];

    /// Lowercase name, also the endpoint path segment.
    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::Dice => "dice",
            GameKind::Coinflip => "coinflip",
            GameKind::Crash => "crash",
            GameKind::Mines => "mines",
            GameKind::Slots => "slots",
            GameKind::Plinko => "plinko",
        }
    }
}

impl std::fmt::Display for GameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raised when parsing a game name from user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown game '{0}', expected one of dice, coinflip, crash, mines, slots, plinko")]
pub struct UnknownGame(String);

impl std::str::FromStr for GameKind {
    type Err = UnknownGame;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownGame(s.to_string()))
    }
}

/// Re-derived outcome values, tagged per game.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum GameOutcome {
    Dice {
        roll: u8,
        win: bool,
    },
    Coinflip {
        outcome: CoinSide,
    },
    Crash {
        multiplier: f64,
    },
    Mines {
        bombs: Vec<u8>,
        payout_lamports: u64,
    },
    Slots {
        outcome_key: &'static str,
        grid: [SlotSymbol; 9],
        payout_lamports: u64,
    },
    Plinko {
        /// None when the stored digest matched neither generation.
        scheme: Option<PlinkoScheme>,
        landing_slots: Option<Vec<u8>>,
    },
}

/// Everything a reproducer re-derives for one round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reproduction {
    /// Re-derived, game-tagged outcome values.
    pub outcome: GameOutcome,
    /// First HMAC of the resolution chain, hex encoded.
    pub first_hmac_hex: String,
}

/// Errors raised while re-deriving an outcome. Always local to one round;
/// the verdict layer converts them into error verdicts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReproduceError {
    /// A seed, digest or wallet string failed to decode.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// Mines board with zero bombs or nothing but bombs.
    #[error("impossible mines board: {mines} mines on {total_tiles} tiles")]
    ImpossibleMines { mines: u8, total_tiles: u8 },
    /// Mines round with no first-safe tile and no opened tiles.
    #[error("mines round carries no first safe tile")]
    MissingFirstSafe,
    /// First safe index outside the board.
    #[error("first safe tile {index} outside the {total_tiles}-tile board")]
    SafeTileOutOfRange { index: u8, total_tiles: u8 },
    /// More tiles opened than safe tiles exist.
    #[error("{opened} tiles opened but the board only has {safe_tiles} safe tiles")]
    TooManyOpened { opened: usize, safe_tiles: u32 },
    /// Coinflip manual check without the joiner's seed.
    #[error("coinflip requires both players' seeds")]
    MissingOpponentSeed,
    /// Mines manual check without the wallet address.
    #[error("mines requires the player wallet address")]
    MissingPlayer,
}

/// Re-derive the authoritative outcome for a revealed round.
///
/// `seed_key` is the already-decoded server seed; dispatch is a closed
/// match so each game's logic stays isolated in its own module.
pub fn reproduce(
    round: &ResolvedRound,
    seed_key: &[u8; 32],
) -> Result<Reproduction, ReproduceError> {
    match round {
        ResolvedRound::Dice(r) => dice::reproduce(r, seed_key),
        ResolvedRound::Coinflip(r) => coinflip::reproduce(r, seed_key),
        ResolvedRound::Crash(r) => crash::reproduce(r, seed_key),
        ResolvedRound::Mines(r) => mines::reproduce(r, seed_key),
        ResolvedRound::Slots(r) => slots::reproduce(r, seed_key),
        ResolvedRound::Plinko(r) => plinko::reproduce(r, seed_key),
    }
}

// =============================================================================
// TESTS
// =============================================================================
