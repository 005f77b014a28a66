//! Slots Reproduction
//!
//! The only game whose outcome is drawn through the counter stream rather
//! than a single digest. One float selects the paytable row, nine draws fill
//! the 3x3 grid, and the middle row is overwritten to exhibit the selected
//! outcome. The nine cell draws happen unconditionally BEFORE the overwrite
//! so stream consumption is identical for every outcome type; reordering
//! them would re-deal every historical grid.

use serde::{Deserialize, Serialize};

use super::{GameOutcome, Reproduction, ReproduceError};
use crate::core::rng::HmacRng;
use crate::history::round::SlotsRound;

/// Fixed-point scale for multipliers and fees.
pub const MICROS: u64 = 1_000_000;

/// The symbol alphabet, in server draw order.
pub const SYMBOLS: [SlotSymbol; 9] = [
    SlotSymbol::Floki,
    SlotSymbol::Wif,
    SlotSymbol::Brett,
    SlotSymbol::Shiba,
    SlotSymbol::Bonk,
    SlotSymbol::Doge,
    SlotSymbol::Pepe,
    SlotSymbol::Sol,
    SlotSymbol::Zoggy,
];

/// One reel symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotSymbol {
    Floki,
    Wif,
    Brett,
    Shiba,
    Bonk,
    Doge,
    Pepe,
    Sol,
    Zoggy,
}

impl SlotSymbol {
    /// Lowercase wire name, as stored in outcome keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotSymbol::Floki => "floki",
            SlotSymbol::Wif => "wif",
            SlotSymbol::Brett => "brett",
            SlotSymbol::Shiba => "shiba",
            SlotSymbol::Bonk => "bonk",
            SlotSymbol::Doge => "doge",
            SlotSymbol::Pepe => "pepe",
            SlotSymbol::Sol => "sol",
            SlotSymbol::Zoggy => "zoggy",
        }
    }
}

impl std::fmt::Display for SlotSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Row classification driving the middle-row overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Two matching middle symbols plus one different.
    Near,
    /// All three middle cells show this symbol.
    Triple(SlotSymbol),
    /// Present in the table with zero frequency; the walk never selects it.
    Jackpot,
    /// Three pairwise-distinct middle symbols.
    Loss,
}

/// One paytable row.
#[derive(Debug, Clone, Copy)]
pub struct PaytableRow {
    pub key: &'static str,
    pub kind: RowKind,
    /// Payout multiplier in micro units (1.5x = 1_500_000).
    pub payout_mul_micros: u64,
    /// Selection frequency. Cumulative order matters; never reorder rows.
    pub freq: f64,
}

/// The live paytable, in cumulative walk order.
pub const PAYTABLE: [PaytableRow; 12] = [
    PaytableRow {
        key: "near_miss",
        kind: RowKind::Near,
        payout_mul_micros: 800_000,
        freq: 0.24999992500002252,
    },
    PaytableRow {
        key: "triple_floki",
        kind: RowKind::Triple(SlotSymbol::Floki),
        payout_mul_micros: 1_500_000,
        freq: 0.04999998500000451,
    },
    PaytableRow {
        key: "triple_wif",
        kind: RowKind::Triple(SlotSymbol::Wif),
        payout_mul_micros: 1_500_000,
        freq: 0.04999998500000451,
    },
    PaytableRow {
        key: "triple_brett",
        kind: RowKind::Triple(SlotSymbol::Brett),
        payout_mul_micros: 1_500_000,
        freq: 0.04999998500000451,
    },
    PaytableRow {
        key: "triple_shiba",
        kind: RowKind::Triple(SlotSymbol::Shiba),
        payout_mul_micros: 3_000_000,
        freq: 0.023609992917002123,
    },
    PaytableRow {
        key: "triple_bonk",
        kind: RowKind::Triple(SlotSymbol::Bonk),
        payout_mul_micros: 6_000_000,
        freq: 0.011804996458501062,
    },
    PaytableRow {
        key: "triple_doge",
        kind: RowKind::Triple(SlotSymbol::Doge),
        payout_mul_micros: 10_000_000,
        freq: 0.007082997875100638,
    },
    PaytableRow {
        key: "triple_pepe",
        kind: RowKind::Triple(SlotSymbol::Pepe),
        payout_mul_micros: 20_000_000,
        freq: 0.003541998937400319,
    },
    PaytableRow {
        key: "triple_sol",
        kind: RowKind::Triple(SlotSymbol::Sol),
        payout_mul_micros: 50_000_000,
        freq: 0.001416999574900128,
    },
    PaytableRow {
        key: "triple_zoggy",
        kind: RowKind::Triple(SlotSymbol::Zoggy),
        payout_mul_micros: 100_000_000,
        freq: 0.000708299787510064,
    },
    PaytableRow {
        key: "jackpot",
        kind: RowKind::Jackpot,
        payout_mul_micros: 1_000_000_000,
        freq: 0.0,
    },
    PaytableRow {
        key: "loss",
        kind: RowKind::Loss,
        payout_mul_micros: 0,
        freq: 0.5518348344495496,
    },
];

/// Walk the cumulative table: the first row whose running total exceeds the
/// draw wins. The jackpot row's zero frequency keeps it unreachable, and a
/// draw past the running total falls through to the final loss row.
pub fn select_row(draw: f64) -> &'static PaytableRow {
    let mut cumulative = 0.0;
    for row in &PAYTABLE {
        cumulative += row.freq;
        if draw < cumulative {
            return row;
        }
    }
    &PAYTABLE[PAYTABLE.len() - 1]
}

/// Re-derive one spin: the paytable row and the full 3x3 grid.
///
/// Draw order is load-bearing: one outcome float, nine unconditional cell
/// draws, then only the overwrite draws the middle row needs.
pub fn spin(rng: &mut HmacRng) -> (&'static PaytableRow, [SlotSymbol; 9]) {
    let row = select_row(rng.next_f64());

    let mut grid = [SlotSymbol::Floki; 9];
    for cell in grid.iter_mut() {
        *cell = *rng.pick(&SYMBOLS);
    }

    match row.kind {
        RowKind::Triple(symbol) => {
            grid[3] = symbol;
            grid[4] = symbol;
            grid[5] = symbol;
        }
        RowKind::Near => {
            let pair = *rng.pick(&SYMBOLS);
            let position = rng.next_int(0, 2) as usize;
            let mut different = *rng.pick(&SYMBOLS);
            while different == pair {
                different = *rng.pick(&SYMBOLS);
            }
            grid[3] = pair;
            grid[4] = pair;
            grid[5] = pair;
            grid[3 + position] = different;
        }
        RowKind::Loss => {
            let first = *rng.pick(&SYMBOLS);
            let mut second = *rng.pick(&SYMBOLS);
            while second == first {
                second = *rng.pick(&SYMBOLS);
            }
            let mut third = *rng.pick(&SYMBOLS);
            while third == first || third == second {
                third = *rng.pick(&SYMBOLS);
            }
            grid[3] = first;
            grid[4] = second;
            grid[5] = third;
        }
        // Unreachable via the walk; the unconditional cells stand
        RowKind::Jackpot => {}
    }

    (row, grid)
}

/// Net payout in lamports, fixed point throughout.
///
/// `floor(bet * mul) - floor(bet * fee)`, clamped at zero when the fee
/// exceeds the gross (loss rounds: gross 0, fee positive).
pub fn payout_lamports(bet_lamports: u64, payout_mul_micros: u64, fee_micros: u64) -> u64 {
    let gross = (u128::from(bet_lamports) * u128::from(payout_mul_micros) / u128::from(MICROS)) as u64;
    let fee = (u128::from(bet_lamports) * u128::from(fee_micros) / u128::from(MICROS)) as u64;
    gross.saturating_sub(fee)
}

/// Space-joined grid cells for mismatch details.
pub fn grid_text(grid: &[SlotSymbol; 9]) -> String {
    grid.iter()
        .map(SlotSymbol::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Re-derive a slots round from the revealed seed.
pub fn reproduce(round: &SlotsRound, seed_key: &[u8; 32]) -> Result<Reproduction, ReproduceError> {
    let mut rng = HmacRng::new(seed_key, &round.common.client_seed, round.common.nonce);
    let first_hmac_hex = rng.first_digest_hex();
    let (row, grid) = spin(&mut rng);
    let payout = payout_lamports(
        round.common.bet_lamports,
        row.payout_mul_micros,
        round.fee_micros,
    );
    Ok(Reproduction {
        outcome: GameOutcome::Slots {
            outcome_key: row.key,
            grid,
            payout_lamports: payout,
        },
        first_hmac_hex,
    })
}

// =============================================================================
// TESTS
// =============================================================================
