//! Upstream Resolved-Round Endpoints
//!
//! One JSON endpoint per game:
//! `GET {base}/{game}/resolved?wallet=<base58>&limit=<n>[&cursor=<id>]`
//! returning `{ "items": [...], "nextCursor": <id|null> }`. The transport
//! sits behind [`RoundSource`] so the service layer and its tests never
//! touch HTTP directly.

use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::round::{
    NormalizeError, ResolvedRound, RoundCommon, WireMinesRound, WireSlotsRound,
};
use crate::games::GameKind;

/// Default API base for local development.
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8080";

/// Transport-level failures. These propagate to the caller and are retried
/// at the caller's discretion; they are never folded into verdicts.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, timeout or protocol failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Endpoint answered with a non-success status.
    #[error("{game} endpoint returned HTTP {code}")]
    Status { game: GameKind, code: u16 },
    /// Page body did not match the envelope shape.
    #[error("failed to decode {game} page: {source}")]
    Decode {
        game: GameKind,
        #[source]
        source: serde_json::Error,
    },
}

/// One fetched row.
///
/// Rows whose side-channel fields fail normalization degrade to
/// `Undecodable`, keeping the common fields so the row still renders with
/// an error verdict; the rest of the page is unaffected.
#[derive(Debug, Clone)]
pub enum FetchedRound {
    Ok(ResolvedRound),
    Undecodable {
        game: GameKind,
        common: RoundCommon,
        error: NormalizeError,
    },
}

impl FetchedRound {
    /// Shared fields regardless of decode outcome.
    pub fn common(&self) -> &RoundCommon {
        match self {
            FetchedRound::Ok(round) => round.common(),
            FetchedRound::Undecodable { common, .. } => common,
        }
    }

    /// Which game the row belongs to.
    pub fn kind(&self) -> GameKind {
        match self {
            FetchedRound::Ok(round) => round.kind(),
            FetchedRound::Undecodable { game, .. } => *game,
        }
    }
}

/// One page of resolved rounds from an upstream endpoint.
#[derive(Debug, Clone)]
pub struct ResolvedPage {
    pub items: Vec<FetchedRound>,
    /// Cursor for the next page; `None` once the game is exhausted.
    pub next_cursor: Option<u64>,
}

/// Where resolved rounds come from. HTTP in production, in-memory in tests.
pub trait RoundSource {
    fn fetch_page<'a>(
        &'a self,
        game: GameKind,
        wallet: &'a str,
        limit: u32,
        cursor: Option<u64>,
    ) -> BoxFuture<'a, Result<ResolvedPage, FetchError>>;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageEnvelope<T> {
    items: Vec<T>,
    #[serde(default)]
    next_cursor: Option<u64>,
}

/// Decode one page body for a game.
///
/// Envelope-level failures fail the page; per-row normalization failures
/// degrade that row only.
pub fn decode_page(game: GameKind, body: &str) -> Result<ResolvedPage, FetchError> {
    match game {
        GameKind::Dice => plain_page(game, body, ResolvedRound::Dice),
        GameKind::Coinflip => plain_page(game, body, ResolvedRound::Coinflip),
        GameKind::Crash => plain_page(game, body, ResolvedRound::Crash),
        GameKind::Plinko => plain_page(game, body, ResolvedRound::Plinko),
        GameKind::Mines => {
            let env: PageEnvelope<WireMinesRound> = parse_envelope(game, body)?;
            let items = env
                .items
                .into_iter()
                .map(|wire| {
                    let common = wire.common.clone();
                    match wire.normalize() {
                        Ok(round) => FetchedRound::Ok(ResolvedRound::Mines(round)),
                        Err(error) => FetchedRound::Undecodable {
                            game,
                            common,
                            error,
                        },
                    }
                })
                .collect();
            Ok(ResolvedPage {
                items,
                next_cursor: env.next_cursor,
            })
        }
        GameKind::Slots => {
            let env: PageEnvelope<WireSlotsRound> = parse_envelope(game, body)?;
            let items = env
                .items
                .into_iter()
                .map(|wire| {
                    let common = wire.common.clone();
                    match wire.normalize() {
                        Ok(round) => FetchedRound::Ok(ResolvedRound::Slots(round)),
                        Err(error) => FetchedRound::Undecodable {
                            game,
                            common,
                            error,
                        },
                    }
                })
                .collect();
            Ok(ResolvedPage {
                items,
                next_cursor: env.next_cursor,
            })
        }
    }
}

fn parse_envelope<T: DeserializeOwned>(
    game: GameKind,
    body: &str,
) -> Result<PageEnvelope<T>, FetchError> {
    serde_json::from_str(body).map_err(|source| FetchError::Decode { game, source })
}

fn plain_page<T, F>(game: GameKind, body: &str, wrap: F) -> Result<ResolvedPage, FetchError>
where
    T: DeserializeOwned,
    F: Fn(T) -> ResolvedRound,
{
    let env: PageEnvelope<T> = parse_envelope(game, body)?;
    Ok(ResolvedPage {
        items: env
            .items
            .into_iter()
            .map(|row| FetchedRound::Ok(wrap(row)))
            .collect(),
        next_cursor: env.next_cursor,
    })
}

/// HTTP implementation over the public endpoints.
pub struct HttpRoundSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRoundSource {
    /// Create a source rooted at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl RoundSource for HttpRoundSource {
    fn fetch_page<'a>(
        &'a self,
        game: GameKind,
        wallet: &'a str,
        limit: u32,
        cursor: Option<u64>,
    ) -> BoxFuture<'a, Result<ResolvedPage, FetchError>> {
        Box::pin(async move {
            let url = format!(
                "{}/{}/resolved",
                self.base_url.trim_end_matches('/'),
                game.as_str()
            );
            let mut request = self
                .client
                .get(&url)
                .query(&[("wallet", wallet)])
                .query(&[("limit", limit)]);
            if let Some(cursor) = cursor {
                request = request.query(&[("cursor", cursor)]);
            }
            debug!(%game, wallet, limit, ?cursor, "fetching resolved rounds");

            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    game,
                    code: status.as_u16(),
                });
            }
            let body = response.text().await?;
            decode_page(game, &body)
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn dice_row(nonce: u64) -> String {
        format!(
            r#"{{
                "player": "7aK3HzRF2AVQ5tnVDFDQ4DBboXHZG8NyrPvxzGrtKAiJ",
                "nonce": {nonce},
                "clientSeed": "abc",
                "serverSeedHash": "de4fed351e9c92fd1b5cbe0e017f30740e1cd2be1b5ad9168983f16324223ef0",
                "firstHmacHex": "65e49e3fba33f16daa6e00a704dc122967aa5d741a357ea93bc50f3c5a33123b",
                "betLamports": 1000000,
                "payoutLamports": 0,
                "createdAt": "2024-05-01T12:00:00Z",
                "resolvedAt": "2024-05-01T12:00:05Z",
                "betType": "under",
                "target": 50,
                "roll": 36
            }}"#
        )
    }

    #[test]
    fn test_decode_dice_page() {
        let body = format!(
            r#"{{ "items": [{}, {}], "nextCursor": 91 }}"#,
            dice_row(1),
            dice_row(2)
        );
        let page = decode_page(GameKind::Dice, &body).unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.next_cursor, Some(91));
        assert!(matches!(
            &page.items[0],
            FetchedRound::Ok(ResolvedRound::Dice(r)) if r.common.nonce == 1
        ));
        // Seed not revealed: absent field maps to None
        assert_eq!(page.items[0].common().server_seed_hex, None);
    }

    #[test]
    fn test_null_cursor_means_exhausted() {
        let body = format!(r#"{{ "items": [{}], "nextCursor": null }}"#, dice_row(1));
        let page = decode_page(GameKind::Dice, &body).unwrap();
        assert_eq!(page.next_cursor, None);

        // Missing cursor field behaves the same
        let body = format!(r#"{{ "items": [{}] }}"#, dice_row(1));
        let page = decode_page(GameKind::Dice, &body).unwrap();
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn test_mines_page_isolates_undecodable_rows() {
        let good = r#"{
            "player": "7aK3HzRF2AVQ5tnVDFDQ4DBboXHZG8NyrPvxzGrtKAiJ",
            "nonce": 3,
            "clientSeed": "abc",
            "serverSeedHash": "de4fed351e9c92fd1b5cbe0e017f30740e1cd2be1b5ad9168983f16324223ef0",
            "firstHmacHex": "1490f62a4131bee287d13e6ce7fbb6dc527656f5a2833d70af59afef6f3f1ea8",
            "betLamports": 1000000,
            "payoutLamports": 1463636,
            "createdAt": "2024-05-01T12:00:00Z",
            "resolvedAt": "2024-05-01T12:00:05Z",
            "mines": 3,
            "totalTiles": 25,
            "firstSafeIndex": 7,
            "opened_json": "[7, 0, 1]"
        }"#;
        let bad = r#"{
            "player": "7aK3HzRF2AVQ5tnVDFDQ4DBboXHZG8NyrPvxzGrtKAiJ",
            "nonce": 4,
            "clientSeed": "abc",
            "serverSeedHash": "de4fed351e9c92fd1b5cbe0e017f30740e1cd2be1b5ad9168983f16324223ef0",
            "firstHmacHex": "1490f62a4131bee287d13e6ce7fbb6dc527656f5a2833d70af59afef6f3f1ea8",
            "betLamports": 1000000,
            "payoutLamports": 0,
            "createdAt": "2024-05-01T12:00:00Z",
            "resolvedAt": "2024-05-01T12:00:05Z",
            "mines": 3,
            "totalTiles": 25,
            "opened_json": "not json"
        }"#;
        let body = format!(r#"{{ "items": [{good}, {bad}], "nextCursor": null }}"#);
        let page = decode_page(GameKind::Mines, &body).unwrap();

        assert_eq!(page.items.len(), 2);
        assert!(matches!(
            &page.items[0],
            FetchedRound::Ok(ResolvedRound::Mines(r)) if r.opened == vec![7, 0, 1]
        ));
        match &page.items[1] {
            FetchedRound::Undecodable { game, common, error } => {
                assert_eq!(*game, GameKind::Mines);
                assert_eq!(common.nonce, 4);
                assert!(matches!(error, NormalizeError::LooseJson(_)));
            }
            other => panic!("expected undecodable row, got {other:?}"),
        }
    }

    #[test]
    fn test_envelope_garbage_fails_the_page() {
        let err = decode_page(GameKind::Dice, "<html>502</html>").unwrap_err();
        assert!(matches!(err, FetchError::Decode { game: GameKind::Dice, .. }));
    }
}
