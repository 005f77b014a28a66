//! Resolved Round Records
//!
//! Strongly-typed, per-game resolved rounds plus the wire shapes the
//! upstream endpoints actually return. Older backend versions stored some
//! list fields as stringified JSON; those arrive through [`LooseList`] and
//! are normalized here, once, at the ingestion boundary. Nothing downstream
//! ever branches on "is this a string or an array" again.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::games::coinflip::CoinSide;
use crate::games::dice::DiceBetType;
use crate::games::mines::DEFAULT_RTP_BPS;
use crate::games::slots::SlotSymbol;
use crate::games::GameKind;

/// Fields every game's resolved round carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundCommon {
    /// Player wallet address, base58.
    pub player: String,
    /// Per-player round counter under the committed seed.
    pub nonce: u64,
    /// Player-chosen seed in effect for the round.
    pub client_seed: String,
    /// SHA-256 commitment published before the round.
    pub server_seed_hash: String,
    /// Revealed server seed; absent until the seed rotates out of service.
    #[serde(default)]
    pub server_seed_hex: Option<String>,
    /// First HMAC digest of the resolution chain, as the server stored it.
    pub first_hmac_hex: String,
    /// Stake in lamports.
    pub bet_lamports: u64,
    /// Amount credited back in lamports, 0 on a loss.
    pub payout_lamports: u64,
    /// When the bet was placed.
    pub created_at: DateTime<Utc>,
    /// When the outcome was resolved.
    pub resolved_at: DateTime<Utc>,
}

/// A resolved dice round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceRound {
    #[serde(flatten)]
    pub common: RoundCommon,
    /// Which side of the target the player bet on.
    pub bet_type: DiceBetType,
    /// Target number the roll is compared against.
    pub target: u8,
    /// Stored roll in `[1, 100]`.
    pub roll: u8,
}

/// A resolved player-versus-player coinflip round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinflipRound {
    #[serde(flatten)]
    pub common: RoundCommon,
    /// The joiner's seed; the creator's seed sits in `common.client_seed`.
    pub opponent_seed: String,
    /// Stored flip result.
    pub outcome: CoinSide,
}

/// A resolved crash round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrashRound {
    #[serde(flatten)]
    pub common: RoundCommon,
    /// Stored bust multiplier.
    pub multiplier: f64,
}

/// A resolved mines round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinesRound {
    #[serde(flatten)]
    pub common: RoundCommon,
    /// Number of bombs hidden in the board.
    pub mines: u8,
    /// Board size, usually 25.
    pub total_tiles: u8,
    /// Index the server designated safe before placing bombs.
    #[serde(default)]
    pub first_safe_index: Option<u8>,
    /// Tiles the player revealed, in click order.
    #[serde(default)]
    pub opened: Vec<u8>,
    /// Bomb layout as stored by the server, when it stored one.
    #[serde(default)]
    pub bomb_indices: Option<Vec<u8>>,
    /// Return-to-player in basis points.
    #[serde(default = "default_rtp_bps")]
    pub rtp_bps: u32,
}

impl MinesRound {
    /// The first safe tile: the explicit field when present, otherwise the
    /// first tile the player opened.
    pub fn first_safe(&self) -> Option<u8> {
        self.first_safe_index.or_else(|| self.opened.first().copied())
    }
}

/// A resolved slots round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotsRound {
    #[serde(flatten)]
    pub common: RoundCommon,
    /// Paytable row key the server recorded, e.g. `triple_floki`.
    #[serde(default)]
    pub outcome_key: Option<String>,
    /// Stored 3x3 grid in row-major order, when the server stored one.
    #[serde(default)]
    pub grid: Option<[SlotSymbol; 9]>,
    /// House fee in micro units of the bet.
    #[serde(default)]
    pub fee_micros: u64,
}

/// A resolved plinko round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlinkoRound {
    #[serde(flatten)]
    pub common: RoundCommon,
    /// Balls dropped this round.
    pub balls: u8,
    /// Peg rows each ball falls through.
    pub rows: u8,
    /// Stored landing slot per ball, when the server stored them.
    #[serde(default)]
    pub landing_slots: Option<Vec<u8>>,
}

/// A resolved round of any supported game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum ResolvedRound {
    Dice(DiceRound),
    Coinflip(CoinflipRound),
    Crash(CrashRound),
    Mines(MinesRound),
    Slots(SlotsRound),
    Plinko(PlinkoRound),
}

impl ResolvedRound {
    /// Shared fields regardless of game.
    pub fn common(&self) -> &RoundCommon {
        match self {
            ResolvedRound::Dice(r) => &r.common,
            ResolvedRound::Coinflip(r) => &r.common,
            ResolvedRound::Crash(r) => &r.common,
            ResolvedRound::Mines(r) => &r.common,
            ResolvedRound::Slots(r) => &r.common,
            ResolvedRound::Plinko(r) => &r.common,
        }
    }

    /// Which game this round belongs to.
    pub fn kind(&self) -> GameKind {
        match self {
            ResolvedRound::Dice(_) => GameKind::Dice,
            ResolvedRound::Coinflip(_) => GameKind::Coinflip,
            ResolvedRound::Crash(_) => GameKind::Crash,
            ResolvedRound::Mines(_) => GameKind::Mines,
            ResolvedRound::Slots(_) => GameKind::Slots,
            ResolvedRound::Plinko(_) => GameKind::Plinko,
        }
    }
}

/// Errors raised while normalizing wire rows into strong records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// A stringified list field did not contain valid JSON.
    #[error("stringified list field is not valid JSON: {0}")]
    LooseJson(String),
    /// A stored slots grid did not have exactly 9 cells.
    #[error("slots grid must have 9 cells, got {got}")]
    GridShape { got: usize },
}

/// A list field that arrives either as a JSON array or as stringified JSON
/// text, depending on upstream version.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LooseList<T> {
    /// The field was a plain JSON array.
    Parsed(Vec<T>),
    /// The field was a JSON string holding serialized JSON.
    Text(String),
}

impl<T: DeserializeOwned> LooseList<T> {
    /// Normalize to a typed vector, parsing the stringified form.
    pub fn normalize(self) -> Result<Vec<T>, NormalizeError> {
        match self {
            LooseList::Parsed(values) => Ok(values),
            LooseList::Text(text) => {
                serde_json::from_str(&text).map_err(|e| NormalizeError::LooseJson(e.to_string()))
            }
        }
    }
}

fn default_rtp_bps() -> u32 {
    DEFAULT_RTP_BPS
}

/// Mines row as the endpoint returns it, before list normalization.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMinesRound {
    #[serde(flatten)]
    pub common: RoundCommon,
    pub mines: u8,
    pub total_tiles: u8,
    #[serde(default)]
    pub first_safe_index: Option<u8>,
    // Legacy column names kept snake_case by the backend
    #[serde(default, rename = "opened_json")]
    pub opened: Option<LooseList<u8>>,
    #[serde(default, rename = "bomb_indices")]
    pub bomb_indices: Option<LooseList<u8>>,
    #[serde(default = "default_rtp_bps")]
    pub rtp_bps: u32,
}

impl WireMinesRound {
    /// Normalize the loose list fields into a strong record.
    pub fn normalize(self) -> Result<MinesRound, NormalizeError> {
        let opened = match self.opened {
            Some(list) => list.normalize()?,
            None => Vec::new(),
        };
        let bomb_indices = self.bomb_indices.map(LooseList::normalize).transpose()?;
        Ok(MinesRound {
            common: self.common,
            mines: self.mines,
            total_tiles: self.total_tiles,
            first_safe_index: self.first_safe_index,
            opened,
            bomb_indices,
            rtp_bps: self.rtp_bps,
        })
    }
}

/// Slots row as the endpoint returns it, before grid normalization.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSlotsRound {
    #[serde(flatten)]
    pub common: RoundCommon,
    #[serde(default)]
    pub outcome_key: Option<String>,
    #[serde(default, rename = "grid_json")]
    pub grid: Option<LooseList<SlotSymbol>>,
    #[serde(default)]
    pub fee_micros: u64,
}

impl WireSlotsRound {
    /// Normalize the grid into a fixed 9-cell array.
    pub fn normalize(self) -> Result<SlotsRound, NormalizeError> {
        let grid = match self.grid {
            None => None,
            Some(list) => {
                let cells = list.normalize()?;
                let got = cells.len();
                let array: [SlotSymbol; 9] = cells
                    .try_into()
                    .map_err(|_| NormalizeError::GridShape { got })?;
                Some(array)
            }
        };
        Ok(SlotsRound {
            common: self.common,
            outcome_key: self.outcome_key,
            grid,
            fee_micros: self.fee_micros,
        })
    }
}

/// Round builders shared by unit tests across the crate.
#[cfg(test)]
pub mod test_support {
    use super::*;
    use crate::games::coinflip::CoinSide;
    use crate::games::dice::DiceBetType;

    /// Revealed seed used by most fixtures.
    pub const SEED_HEX: &str = "510836b02d635b2ec881fe09a09e77c26e0163654ccd26ed622477fdd7947151";
    /// Commitment to [`SEED_HEX`].
    pub const SEED_COMMITMENT: &str =
        "de4fed351e9c92fd1b5cbe0e017f30740e1cd2be1b5ad9168983f16324223ef0";
    /// Wallet address used by most fixtures.
    pub const PLAYER: &str = "7aK3HzRF2AVQ5tnVDFDQ4DBboXHZG8NyrPvxzGrtKAiJ";

    pub fn ts(text: &str) -> DateTime<Utc> {
        text.parse().expect("fixture timestamp")
    }

    pub fn common(client_seed: &str, nonce: u64) -> RoundCommon {
        RoundCommon {
            player: PLAYER.to_string(),
            nonce,
            client_seed: client_seed.to_string(),
            server_seed_hash: SEED_COMMITMENT.to_string(),
            server_seed_hex: Some(SEED_HEX.to_string()),
            first_hmac_hex: String::new(),
            bet_lamports: 1_000_000,
            payout_lamports: 0,
            created_at: ts("2024-05-01T12:00:00Z"),
            resolved_at: ts("2024-05-01T12:00:05Z"),
        }
    }

    pub fn dice_round(
        client_seed: &str,
        nonce: u64,
        bet_type: DiceBetType,
        target: u8,
        roll: u8,
    ) -> DiceRound {
        DiceRound {
            common: common(client_seed, nonce),
            bet_type,
            target,
            roll,
        }
    }

    pub fn coinflip_round(
        creator_seed: &str,
        joiner_seed: &str,
        nonce: u64,
        outcome: CoinSide,
    ) -> CoinflipRound {
        CoinflipRound {
            common: common(creator_seed, nonce),
            opponent_seed: joiner_seed.to_string(),
            outcome,
        }
    }

    pub fn crash_round(client_seed: &str, nonce: u64, multiplier: f64) -> CrashRound {
        CrashRound {
            common: common(client_seed, nonce),
            multiplier,
        }
    }

    pub fn mines_round(client_seed: &str, nonce: u64, mines: u8, opened: Vec<u8>) -> MinesRound {
        MinesRound {
            common: common(client_seed, nonce),
            mines,
            total_tiles: 25,
            first_safe_index: opened.first().copied(),
            opened,
            bomb_indices: None,
            rtp_bps: DEFAULT_RTP_BPS,
        }
    }

    pub fn slots_round(client_seed: &str, nonce: u64) -> SlotsRound {
        SlotsRound {
            common: common(client_seed, nonce),
            outcome_key: None,
            grid: None,
            fee_micros: 30_000,
        }
    }

    pub fn plinko_round(
        client_seed: &str,
        nonce: u64,
        balls: u8,
        rows: u8,
        stored_first_hmac: &str,
    ) -> PlinkoRound {
        let mut common = common(client_seed, nonce);
        common.first_hmac_hex = stored_first_hmac.to_string();
        PlinkoRound {
            common,
            balls,
            rows,
            landing_slots: None,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
