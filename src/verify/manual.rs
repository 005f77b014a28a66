//! Ad-Hoc Manual Checks
//!
//! The dispute path: a player pastes the literal values from their round
//! (revealed seed, client seed or seeds, nonce, and optionally the digest
//! the server claims) and gets back the recomputed chain head plus a
//! human-readable outcome note, outside the automatic batch flow.

use serde::{Deserialize, Serialize};

use crate::core::encode::decode_server_seed;
use crate::core::hash::{hmac_sha256, seed_commitment_hex};
use crate::core::rng::HmacRng;
use crate::games::coinflip::CoinSide;
use crate::games::{crash, dice, mines, plinko, slots, GameKind, ReproduceError};

/// Inputs a player can copy straight out of the history table.
#[derive(Debug, Clone, Deserialize)]
pub struct ManualCheck {
    pub game: GameKind,
    pub server_seed_hex: String,
    pub client_seed: String,
    /// Joiner's seed; coinflip only.
    pub opponent_seed: Option<String>,
    /// Wallet address; mines only, since its chain key binds the wallet.
    pub player: Option<String>,
    pub nonce: u64,
    /// Digest the server claims, if the player wants it checked.
    pub expected_hmac_hex: Option<String>,
}

/// What the manual panel reports back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManualReport {
    /// Commitment the pasted seed hashes to.
    pub commitment_hex: String,
    /// Recomputed chain-head digest for the current generation.
    pub computed_hmac_hex: String,
    /// Legacy-generation candidate; plinko only.
    pub legacy_hmac_hex: Option<String>,
    /// Whether the pasted expected digest matches either candidate.
    /// Case-insensitive, since this value arrives via clipboard.
    pub expected_matches: Option<bool>,
    /// One-line outcome summary.
    pub note: String,
}

/// Recompute one round's chain head from pasted literals.
pub fn run_manual_check(check: &ManualCheck) -> Result<ManualReport, ReproduceError> {
    let seed_key = decode_server_seed(&check.server_seed_hex)?;
    let commitment_hex = seed_commitment_hex(&check.server_seed_hex);

    let (computed_hmac_hex, legacy_hmac_hex, note) = match check.game {
        GameKind::Dice => {
            let message = format!("{}{}", check.client_seed, check.nonce);
            let digest = hmac_sha256(&seed_key, message.as_bytes());
            let roll = dice::roll_from_digest(&digest);
            (hex::encode(digest), None, format!("roll {roll}"))
        }
        GameKind::Coinflip => {
            let joiner = check
                .opponent_seed
                .as_deref()
                .ok_or(ReproduceError::MissingOpponentSeed)?;
            let message = format!("{}|{}|{}", check.client_seed, joiner, check.nonce);
            let digest = hmac_sha256(&seed_key, message.as_bytes());
            let side = CoinSide::from_bit(digest[0]);
            (hex::encode(digest), None, format!("outcome {side}"))
        }
        GameKind::Crash => {
            let message = format!("{}{}", check.client_seed, check.nonce);
            let digest = hmac_sha256(&seed_key, message.as_bytes());
            let multiplier = crash::multiplier_from_uniform(crash::uniform_from_digest(&digest));
            (
                hex::encode(digest),
                None,
                format!("multiplier {multiplier:.2}x"),
            )
        }
        GameKind::Mines => {
            let player = check
                .player
                .as_deref()
                .ok_or(ReproduceError::MissingPlayer)?;
            let bomb_key =
                mines::derive_bomb_key(&seed_key, player, check.nonce, &check.client_seed)?;
            (
                hex::encode(bomb_key),
                None,
                "bomb key for the round's layout draws".to_string(),
            )
        }
        GameKind::Slots => {
            let mut rng = HmacRng::new(&seed_key, &check.client_seed, check.nonce);
            let first = rng.first_digest_hex();
            let (row, _) = slots::spin(&mut rng);
            (first, None, format!("outcome {}", row.key))
        }
        GameKind::Plinko => {
            let (v1, v2) = plinko::candidate_hmacs(&seed_key, &check.client_seed, check.nonce);
            (
                v2,
                Some(v1),
                "current-generation digest; legacy candidate included".to_string(),
            )
        }
    };

    let expected_matches = check.expected_hmac_hex.as_deref().map(|expected| {
        expected.eq_ignore_ascii_case(&computed_hmac_hex)
            || legacy_hmac_hex
                .as_deref()
                .is_some_and(|v1| expected.eq_ignore_ascii_case(v1))
    });

    Ok(ManualReport {
        commitment_hex,
        computed_hmac_hex,
        legacy_hmac_hex,
        expected_matches,
        note,
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::round::test_support::{PLAYER, SEED_COMMITMENT, SEED_HEX};

    fn base_check(game: GameKind) -> ManualCheck {
        ManualCheck {
            game,
            server_seed_hex: SEED_HEX.to_string(),
            client_seed: "abc".to_string(),
            opponent_seed: None,
            player: None,
            nonce: 1,
            expected_hmac_hex: None,
        }
    }

    #[test]
    fn test_dice_manual_check_matches_fixture() {
        let mut check = base_check(GameKind::Dice);
        check.expected_hmac_hex =
            Some("65E49E3FBA33F16DAA6E00A704DC122967AA5D741A357EA93BC50F3C5A33123B".to_string());

        let report = run_manual_check(&check).unwrap();
        assert_eq!(report.commitment_hex, SEED_COMMITMENT);
        assert_eq!(report.note, "roll 36");
        // Uppercase pasted digest still matches
        assert_eq!(report.expected_matches, Some(true));
    }

    #[test]
    fn test_wrong_expected_digest_reports_false() {
        let mut check = base_check(GameKind::Dice);
        check.expected_hmac_hex = Some("00".repeat(32));
        let report = run_manual_check(&check).unwrap();
        assert_eq!(report.expected_matches, Some(false));
    }

    #[test]
    fn test_coinflip_requires_both_seeds() {
        let check = base_check(GameKind::Coinflip);
        assert!(matches!(
            run_manual_check(&check),
            Err(ReproduceError::MissingOpponentSeed)
        ));

        let mut check = base_check(GameKind::Coinflip);
        check.client_seed = "alice-seed".to_string();
        check.opponent_seed = Some("bob-seed".to_string());
        check.nonce = 7;
        let report = run_manual_check(&check).unwrap();
        assert_eq!(report.note, "outcome tails");
    }

    #[test]
    fn test_mines_requires_wallet() {
        let mut check = base_check(GameKind::Mines);
        check.nonce = 3;
        assert!(matches!(
            run_manual_check(&check),
            Err(ReproduceError::MissingPlayer)
        ));

        check.player = Some(PLAYER.to_string());
        let report = run_manual_check(&check).unwrap();
        assert_eq!(
            report.computed_hmac_hex,
            "1490f62a4131bee287d13e6ce7fbb6dc527656f5a2833d70af59afef6f3f1ea8"
        );
    }

    #[test]
    fn test_plinko_accepts_either_generation() {
        let mut check = base_check(GameKind::Plinko);
        check.nonce = 5;
        check.expected_hmac_hex =
            Some("d16d37d3b96f92e4d1243cb4c50b893777fd8432c4a2d0a148c9891461d73201".to_string());

        let report = run_manual_check(&check).unwrap();
        // Legacy digest pasted, v2 computed, still a match
        assert_eq!(
            report.computed_hmac_hex,
            "9c3c3f226500e0969ee723f55950dd25f254d4c979f69def1a0755c7801649a1"
        );
        assert_eq!(report.expected_matches, Some(true));
    }

    #[test]
    fn test_slots_note_names_the_outcome() {
        let mut check = base_check(GameKind::Slots);
        check.nonce = 2;
        let report = run_manual_check(&check).unwrap();
        assert_eq!(report.note, "outcome triple_floki");
        assert_eq!(
            report.computed_hmac_hex,
            "46172d79207fb7f548ce0aeb53e24c66f8a7654b2d534f01ff20a753b0c677fe"
        );
    }

    #[test]
    fn test_malformed_seed_is_rejected() {
        let mut check = base_check(GameKind::Dice);
        check.server_seed_hex = "zz".repeat(32);
        assert!(run_manual_check(&check).is_err());
    }
}
