//! Mines Reproduction
//!
//! Bomb placement runs off a per-round derived key so the layout binds the
//! wallet as well as the seeds: the key is the HMAC of
//! `walletBytes || asciiDecimal(nonce) || clientSeed`, and bombs are drawn
//! by hashing an ASCII counter under that key. The cash-out multiplier is
//! the inverse hypergeometric product scaled by the configured RTP.

use super::{GameOutcome, Reproduction, ReproduceError};
use crate::core::encode::decode_base58;
use crate::core::hash::{digest_u32_be, hmac_sha256, Digest32};
use crate::history::round::MinesRound;

/// Default return-to-player in basis points (98%).
pub const DEFAULT_RTP_BPS: u32 = 9_800;

/// Derive the per-round bomb key.
///
/// The wallet enters as its decoded 32 raw bytes, the nonce as its ASCII
/// decimal text, then the client seed's UTF-8 bytes. No separators.
pub fn derive_bomb_key(
    seed_key: &[u8; 32],
    player_b58: &str,
    nonce: u64,
    client_seed: &str,
) -> Result<Digest32, ReproduceError> {
    let wallet = decode_base58(player_b58)?;
    let nonce_text = nonce.to_string();
    let mut message = Vec::with_capacity(wallet.len() + nonce_text.len() + client_seed.len());
    message.extend_from_slice(&wallet);
    message.extend_from_slice(nonce_text.as_bytes());
    message.extend_from_slice(client_seed.as_bytes());
    Ok(hmac_sha256(seed_key, &message))
}

/// Draw the bomb layout from a bomb key. Returned indices are sorted.
///
/// Each iteration hashes the ASCII decimal counter under the bomb key and
/// maps the digest onto a tile. A draw that hits the first safe tile is
/// skipped but its counter is still spent; redrawing in place would shift
/// every later bomb for rounds with an early collision. Duplicate draws are
/// likewise skipped, giving sampling without replacement.
pub fn place_bombs(bomb_key: &Digest32, mines: u8, total_tiles: u8, first_safe: u8) -> Vec<u8> {
    let mut bombs: Vec<u8> = Vec::with_capacity(mines as usize);
    let mut counter: u32 = 0;
    while bombs.len() < mines as usize {
        let digest = hmac_sha256(bomb_key, counter.to_string().as_bytes());
        counter = counter.wrapping_add(1);
        let tile = (digest_u32_be(&digest) % total_tiles as u32) as u8;
        if tile == first_safe || bombs.contains(&tile) {
            continue;
        }
        bombs.push(tile);
    }
    bombs.sort_unstable();
    bombs
}

/// Cash-out multiplier after `opened` safe reveals.
///
/// Product of `(T - i) / (T - M - i)` for each reveal, scaled by RTP. Grows
/// with every safe tile because the remaining board gets more dangerous.
pub fn cashout_multiplier(opened: u32, mines: u8, total_tiles: u8, rtp_bps: u32) -> f64 {
    let total = u32::from(total_tiles);
    let bombs = u32::from(mines);
    let mut multiplier = 1.0_f64;
    for i in 0..opened {
        multiplier *= f64::from(total - i) / f64::from(total - bombs - i);
    }
    multiplier * (f64::from(rtp_bps) / 10_000.0)
}

/// Payout in lamports for a cashed-out round.
pub fn payout_lamports(bet_lamports: u64, multiplier: f64) -> u64 {
    (bet_lamports as f64 * multiplier).floor() as u64
}

/// Re-derive a mines round from the revealed seed.
pub fn reproduce(round: &MinesRound, seed_key: &[u8; 32]) -> Result<Reproduction, ReproduceError> {
    let total = round.total_tiles;
    if round.mines == 0 || round.mines >= total {
        return Err(ReproduceError::ImpossibleMines {
            mines: round.mines,
            total_tiles: total,
        });
    }
    let first_safe = round
        .first_safe()
        .ok_or(ReproduceError::MissingFirstSafe)?;
    if first_safe >= total {
        return Err(ReproduceError::SafeTileOutOfRange {
            index: first_safe,
            total_tiles: total,
        });
    }
    let safe_tiles = u32::from(total) - u32::from(round.mines);
    if round.opened.len() as u32 > safe_tiles {
        return Err(ReproduceError::TooManyOpened {
            opened: round.opened.len(),
            safe_tiles,
        });
    }

    let bomb_key = derive_bomb_key(
        seed_key,
        &round.common.player,
        round.common.nonce,
        &round.common.client_seed,
    )?;
    let bombs = place_bombs(&bomb_key, round.mines, total, first_safe);

    let multiplier = cashout_multiplier(
        round.opened.len() as u32,
        round.mines,
        total,
        round.rtp_bps,
    );
    let payout = payout_lamports(round.common.bet_lamports, multiplier);

    Ok(Reproduction {
        outcome: GameOutcome::Mines {
            bombs,
            payout_lamports: payout,
        },
        first_hmac_hex: hex::encode(bomb_key),
    })
}

// =============================================================================
// TESTS
// =============================================================================
