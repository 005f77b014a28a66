//! # Fairroll Verifier
//!
//! Provably-fair round verification for the Fairroll casino, built so any
//! player can re-derive every resolved round from public inputs.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     FAIRROLL VERIFIER                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── encode.rs   - Hex and base58 codecs                     │
//! │  ├── hash.rs     - SHA-256 commitments, HMAC chains          │
//! │  └── rng.rs      - Counter-mode HMAC value stream            │
//! │                                                              │
//! │  games/          - Outcome reproduction (deterministic)      │
//! │  ├── dice.rs     - Roll under or over a target               │
//! │  ├── coinflip.rs - Player-versus-player flip                 │
//! │  ├── crash.rs    - Bust multiplier curve                     │
//! │  ├── mines.rs    - Bomb placement and cashout                │
//! │  ├── slots.rs    - Paytable draw and 3x3 grid                │
//! │  └── plinko.rs   - Peg-board descent per ball                │
//! │                                                              │
//! │  history/        - Fetch and assembly (non-deterministic)    │
//! │  ├── round.rs    - Typed round records                       │
//! │  ├── fetch.rs    - Per-game resolved endpoints               │
//! │  └── assemble.rs - Verified, merged history pages            │
//! │                                                              │
//! │  verify/         - Verdicts                                  │
//! │  ├── verdict.rs  - Four-way status                           │
//! │  ├── engine.rs   - Orchestrator and batch fan-out            │
//! │  └── manual.rs   - Paste-in dispute checks                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `games/` modules are **100% deterministic**: given the
//! revealed server seed and the stored round inputs they reproduce the
//! outcome the server resolved, byte for byte, on any platform. Every
//! observable value derives from
//! `HMAC-SHA256(serverSeed, clientSeed || nonce || counter)`, and the
//! seed's SHA-256 commitment is published before any bet is taken, so the
//! operator cannot steer a round after the fact.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod games;
pub mod history;
pub mod verify;

// Re-export commonly used types
pub use games::{GameKind, GameOutcome, ReproduceError, Reproduction};
pub use history::{
    HistoryCursor, HistoryFilter, HistoryPage, HistoryService, HttpRoundSource, ResolvedRound,
};
pub use verify::{
    run_manual_check, verify_round, verify_rounds, ManualCheck, ManualReport, VerifyStatus,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default rows requested per game per history page
pub const DEFAULT_PAGE_LIMIT: u32 = 25;
