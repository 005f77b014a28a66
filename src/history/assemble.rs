//! History Assembly
//!
//! Turns raw per-game pages into one verified, display-ready history:
//! fetch every selected game concurrently, verify each round, then merge
//! newest-first. A generation counter makes the whole pipeline
//! last-request-wins, so a stale page can never overwrite a newer one.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::future;
use serde::Serialize;
use tracing::debug;

use super::fetch::{FetchError, FetchedRound, RoundSource};
use super::round::{ResolvedRound, RoundCommon};
use crate::games::GameKind;
use crate::verify::{verify_rounds, VerifyStatus};

/// Render-ready projection of one round, independent of decode outcome.
/// Everything a history table column needs, with no game-specific types.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundDisplay {
    pub game: GameKind,
    pub player: String,
    pub nonce: u64,
    pub bet_lamports: u64,
    pub payout_lamports: u64,
    /// One-line outcome description, e.g. `roll 36 (under 50)`.
    pub result_text: String,
    /// Player-chosen seed in effect for the round.
    pub client_seed: String,
    /// Revealed server seed, once the rotation published it.
    pub server_seed_hex: Option<String>,
    /// Pre-round commitment the seed must hash back to.
    pub server_seed_hash: String,
    /// Chain-head digest as the server stored it.
    pub first_hmac_hex: String,
    /// Resolution time rendered for the table.
    pub resolved_at_text: String,
    /// Resolution time in epoch milliseconds, the sort key.
    pub resolved_at_ms: i64,
}

/// One history row: the round (when it decoded), its display summary and
/// its verdict.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedRow {
    pub round: Option<ResolvedRound>,
    pub display: RoundDisplay,
    pub verify: VerifyStatus,
}

/// Which wallet and which games a history request covers.
#[derive(Debug, Clone)]
pub struct HistoryFilter {
    pub wallet: String,
    /// `None` means all games merged together.
    pub game: Option<GameKind>,
}

impl HistoryFilter {
    /// The games this filter selects, in display order.
    pub fn games(&self) -> Vec<GameKind> {
        match self.game {
            Some(game) => vec![game],
            None => GameKind::ALL.to_vec(),
        }
    }
}

/// Per-game pagination state carried between pages.
///
/// Each game paginates independently; a game drops out of later fetches
/// once its endpoint reports no further cursor.
#[derive(Debug, Clone, Default)]
pub struct HistoryCursor {
    next: BTreeMap<GameKind, u64>,
    exhausted: BTreeSet<GameKind>,
}

impl HistoryCursor {
    /// Cursor to send for a game; `None` on the first page.
    pub fn cursor_for(&self, game: GameKind) -> Option<u64> {
        self.next.get(&game).copied()
    }

    /// Whether a game has no further pages.
    pub fn is_exhausted(&self, game: GameKind) -> bool {
        self.exhausted.contains(&game)
    }

    /// Record the cursor a page came back with.
    pub fn record(&mut self, game: GameKind, next_cursor: Option<u64>) {
        match next_cursor {
            Some(cursor) => {
                self.next.insert(game, cursor);
            }
            None => {
                self.next.remove(&game);
                self.exhausted.insert(game);
            }
        }
    }

    /// Whether every one of the given games is exhausted.
    pub fn all_exhausted<I>(&self, games: I) -> bool
    where
        I: IntoIterator<Item = GameKind>,
    {
        games.into_iter().all(|game| self.is_exhausted(game))
    }
}

/// One assembled page of verified history.
#[derive(Debug, Clone)]
pub struct HistoryPage {
    /// Rows merged across games, newest first.
    pub rows: Vec<EnrichedRow>,
    /// Cursor state to pass back for the next page.
    pub cursor: HistoryCursor,
}

/// Fetches, verifies and merges history pages for one viewer.
pub struct HistoryService<S> {
    source: S,
    generation: AtomicU64,
}

impl<S: RoundSource> HistoryService<S> {
    /// Create a service over the given source.
    pub fn new(source: S) -> Self {
        Self {
            source,
            generation: AtomicU64::new(0),
        }
    }

    /// Fetch and assemble the next page.
    ///
    /// Every selected, non-exhausted game is fetched concurrently with its
    /// own cursor. Returns `Ok(None)` when a newer call started while this
    /// one was in flight; the newer call's page is the one to keep.
    pub async fn next_page(
        &self,
        filter: &HistoryFilter,
        limit: u32,
        mut cursor: HistoryCursor,
    ) -> Result<Option<HistoryPage>, FetchError> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let games: Vec<GameKind> = filter
            .games()
            .into_iter()
            .filter(|game| !cursor.is_exhausted(*game))
            .collect();
        let fetches = games.iter().map(|&game| {
            self.source
                .fetch_page(game, &filter.wallet, limit, cursor.cursor_for(game))
        });
        let pages = future::try_join_all(fetches).await?;

        let mut items = Vec::new();
        for (game, page) in games.into_iter().zip(pages) {
            cursor.record(game, page.next_cursor);
            items.extend(page.items);
        }

        let mut rows = enrich_rounds(items).await;
        rows.sort_by(|a, b| b.display.resolved_at_ms.cmp(&a.display.resolved_at_ms));

        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!(ticket, "history page superseded while in flight");
            return Ok(None);
        }
        Ok(Some(HistoryPage { rows, cursor }))
    }
}

/// Verify a mixed batch of fetched rows and wrap each in its display form.
///
/// Undecodable rows skip verification and carry an error verdict; decoded
/// rows go through the batch verifier together.
pub async fn enrich_rounds(items: Vec<FetchedRound>) -> Vec<EnrichedRow> {
    let mut rows = Vec::with_capacity(items.len());
    let mut decoded = Vec::new();
    for item in items {
        match item {
            FetchedRound::Ok(round) => decoded.push(round),
            FetchedRound::Undecodable {
                game,
                common,
                error,
            } => rows.push(EnrichedRow {
                round: None,
                display: undecodable_display(game, &common),
                verify: VerifyStatus::Error {
                    details: error.to_string(),
                },
            }),
        }
    }
    for (round, status) in verify_rounds(decoded).await {
        rows.push(EnrichedRow {
            display: display_for(&round),
            round: Some(round),
            verify: status,
        });
    }
    rows
}

/// Build the one-line display summary for a decoded round.
pub fn display_for(round: &ResolvedRound) -> RoundDisplay {
    let result_text = match round {
        ResolvedRound::Dice(r) => format!("roll {} ({} {})", r.roll, r.bet_type, r.target),
        ResolvedRound::Coinflip(r) => r.outcome.to_string(),
        ResolvedRound::Crash(r) => format!("{:.2}x", r.multiplier),
        ResolvedRound::Mines(r) => {
            format!("{} mines / {} opened", r.mines, r.opened.len())
        }
        ResolvedRound::Slots(r) => match &r.outcome_key {
            Some(key) => key.clone(),
            None => "slots".to_string(),
        },
        ResolvedRound::Plinko(r) => match &r.landing_slots {
            Some(slots) => format!("lands {slots:?}"),
            None => format!("{} balls / {} rows", r.balls, r.rows),
        },
    };
    project(round.kind(), round.common(), result_text)
}

fn undecodable_display(game: GameKind, common: &RoundCommon) -> RoundDisplay {
    project(game, common, "(undecodable)".to_string())
}

fn project(game: GameKind, common: &RoundCommon, result_text: String) -> RoundDisplay {
    RoundDisplay {
        game,
        player: common.player.clone(),
        nonce: common.nonce,
        bet_lamports: common.bet_lamports,
        payout_lamports: common.payout_lamports,
        result_text,
        client_seed: common.client_seed.clone(),
        server_seed_hex: common.server_seed_hex.clone(),
        server_seed_hash: common.server_seed_hash.clone(),
        first_hmac_hex: common.first_hmac_hex.clone(),
        resolved_at_text: common.resolved_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        resolved_at_ms: common.resolved_at.timestamp_millis(),
    }
}

// =============================================================================
// TESTS
// =============================================================================
