//! Seed And Address Encodings
//!
//! Every externally supplied string (revealed server seeds, expected digests,
//! wallet addresses) is decoded here, at the edge. Decoding failures are
//! ordinary values so the verifier can turn a malformed row into an error
//! verdict instead of aborting a whole page.

use thiserror::Error;

/// Length of a revealed server seed in hex characters (32 bytes).
pub const SERVER_SEED_HEX_LEN: usize = 64;

/// Errors produced when decoding externally supplied strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Hex string has an odd length or a non-hex character.
    #[error("invalid hex: {0}")]
    Hex(String),
    /// Base58 string contains a character outside the Bitcoin alphabet.
    #[error("invalid base58: {0}")]
    Base58(String),
    /// Server seed is present but does not have the revealed-seed shape.
    #[error("server seed must be {SERVER_SEED_HEX_LEN} hex chars, got {got}")]
    SeedShape { got: usize },
}

/// Decode a hex string into bytes.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, DecodeError> {
    hex::decode(s).map_err(|e| DecodeError::Hex(e.to_string()))
}

/// Lowercase hex encoding, the form every digest is stored and compared in.
pub fn encode_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decode a base58 string (Bitcoin alphabet) into bytes.
///
/// Wallet addresses enter outcome messages as their decoded 32 raw bytes,
/// never as the base58 text itself.
pub fn decode_base58(s: &str) -> Result<Vec<u8>, DecodeError> {
    bs58::decode(s)
        .into_vec()
        .map_err(|e| DecodeError::Base58(e.to_string()))
}

/// Decode a revealed server seed into the 32-byte HMAC key.
///
/// The seed must be exactly 64 hex characters. Shorter, longer or odd-length
/// strings are rejected here rather than silently truncated, because a
/// truncated key would reproduce a different outcome chain.
pub fn decode_server_seed(hex_str: &str) -> Result<[u8; 32], DecodeError> {
    if hex_str.len() != SERVER_SEED_HEX_LEN {
        return Err(DecodeError::SeedShape { got: hex_str.len() });
    }
    let bytes = decode_hex(hex_str)?;
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&bytes);
    Ok(seed)
}

// =============================================================================
// TESTS
// =============================================================================
