//! Round History
//!
//! Everything between the upstream endpoints and a rendered history page:
//! typed round records, the per-game fetch layer, and the assembly service
//! that verifies and merges pages.

pub mod assemble;
pub mod fetch;
pub mod round;

pub use assemble::{
    enrich_rounds, EnrichedRow, HistoryCursor, HistoryFilter, HistoryPage, HistoryService,
    RoundDisplay,
};
pub use fetch::{
    decode_page, FetchError, FetchedRound, HttpRoundSource, ResolvedPage, RoundSource,
    DEFAULT_API_BASE,
};
pub use round::{
    CoinflipRound, CrashRound, DiceRound, MinesRound, NormalizeError, PlinkoRound, ResolvedRound,
    RoundCommon, SlotsRound,
};
