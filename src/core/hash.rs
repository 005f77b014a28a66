//! Commitment And Chain Hashing
//!
//! SHA-256 seed commitments plus the HMAC-SHA256 primitive every outcome
//! chain is built from. All digests are fixed 32-byte arrays; hex encoding
//! happens only at comparison and display boundaries.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

/// HMAC-SHA256 instantiation used for every outcome chain.
pub type HmacSha256 = Hmac<Sha256>;

/// A 256-bit digest.
pub type Digest32 = [u8; 32];

/// SHA-256 of raw bytes.
pub fn sha256(data: &[u8]) -> Digest32 {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-256 of raw bytes, hex encoded.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Commitment published before a round: SHA-256 over the ASCII hex string of
/// the server seed, NOT over the decoded seed bytes.
///
/// The upstream hashes the hex text, so hashing decoded bytes here would
/// reject every honestly revealed seed.
pub fn seed_commitment_hex(server_seed_hex: &str) -> String {
    sha256_hex(server_seed_hex.as_bytes())
}

/// HMAC-SHA256 over a message.
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> Digest32 {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(message);
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&mac.finalize().into_bytes());
    digest
}

/// HMAC-SHA256 over a message, hex encoded.
pub fn hmac_sha256_hex(key: &[u8], message: &[u8]) -> String {
    hex::encode(hmac_sha256(key, message))
}

/// First 4 digest bytes as a big-endian u32.
#[inline]
pub fn digest_u32_be(digest: &Digest32) -> u32 {
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// First 8 digest bytes as a big-endian u64.
#[inline]
pub fn digest_u64_be(digest: &Digest32) -> u64 {
    u64::from_be_bytes([
        digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6], digest[7],
    ])
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vectors() {
        // FIPS 180-2 vectors
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hmac_known_vector() {
        // RFC 4231 test case 2
        let digest = hmac_sha256_hex(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(
            digest,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_seed_commitment_hashes_hex_text() {
        let seed_hex = "510836b02d635b2ec881fe09a09e77c26e0163654ccd26ed622477fdd7947151";
        // This value must never change; it is what players saw before the round.
        assert_eq!(
            seed_commitment_hex(seed_hex),
            "de4fed351e9c92fd1b5cbe0e017f30740e1cd2be1b5ad9168983f16324223ef0"
        );
        // Hashing the decoded bytes gives a different digest entirely
        let bytes = hex::decode(seed_hex).unwrap();
        assert_ne!(seed_commitment_hex(seed_hex), sha256_hex(&bytes));
    }

    #[test]
    fn test_commitment_is_bit_sensitive() {
        let a =
            seed_commitment_hex("510836b02d635b2ec881fe09a09e77c26e0163654ccd26ed622477fdd7947151");
        let b =
            seed_commitment_hex("500836b02d635b2ec881fe09a09e77c26e0163654ccd26ed622477fdd7947151");
        assert_ne!(a, b);
    }

    #[test]
    fn test_digest_big_endian_extraction() {
        let mut digest = [0u8; 32];
        digest[..8].copy_from_slice(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);
        assert_eq!(digest_u32_be(&digest), 0x0102_0304);
        assert_eq!(digest_u64_be(&digest), 0x0102_0304_0506_0708);
    }
}
