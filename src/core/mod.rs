//! Core deterministic primitives.
//!
//! Everything in this module is bit-for-bit reproducible across platforms.
//! The per-game reproducers are thin compositions of these pieces.

pub mod encode;
pub mod hash;
pub mod rng;

// Re-export core types
pub use encode::{decode_base58, decode_hex, decode_server_seed, DecodeError};
pub use hash::{hmac_sha256, hmac_sha256_hex, seed_commitment_hex, sha256_hex, Digest32};
pub use rng::HmacRng;
