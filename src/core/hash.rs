//! State Hashing for Verification
//!
//! Provides deterministic hashing of reconstructed replay state for:
//! - Checking that two navigation paths land on the same round state
//! - Logging compact round fingerprints
//! - Regression fixtures in tests

use sha2::{Sha256, Digest};

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// Deterministic hasher for round state.
///
/// Wraps SHA-256 with fixed-width and length-prefixed updates.
/// Order of updates is critical for determinism.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for a reconstructed round.
    pub fn for_round_state() -> Self {
        Self::new(b"RAT_ARENA_ROUND_V1")
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a length-prefixed byte section.
    ///
    /// The prefix keeps adjacent sections from bleeding into each other.
    #[inline]
    pub fn update_section(&mut self, bytes: &[u8]) {
        self.update_u64(bytes.len() as u64);
        self.hasher.update(bytes);
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

/// Compute the fingerprint of a round at a given turn.
///
/// Round and turn are always hashed first; the closure adds the
/// round's contents.
pub fn compute_state_hash<F>(round: u32, turn: u32, add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::for_round_state();

    hasher.update_u32(round);
    hasher.update_u32(turn);

    add_state(&mut hasher);

    hasher.finalize()
}

/// Short hex prefix for log lines.
pub fn short_hex(hash: &StateHash) -> String {
    hex::encode(&hash[..6])
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_hasher_determinism() {
        let make_hash = || {
            let mut hasher = StateHasher::for_round_state();
            hasher.update_u32(100);
            hasher.update_u64(12345);
            hasher.update_section(b"bodies");
            hasher.finalize()
        };

        assert_eq!(make_hash(), make_hash());
    }

    #[test]
    fn test_hash_order_matters() {
        let hash1 = {
            let mut h = StateHasher::new(b"test");
            h.update_u32(1);
            h.update_u32(2);
            h.finalize()
        };

        let hash2 = {
            let mut h = StateHasher::new(b"test");
            h.update_u32(2);
            h.update_u32(1);
            h.finalize()
        };

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_sections_are_length_prefixed() {
        let hash1 = {
            let mut h = StateHasher::new(b"test");
            h.update_section(&[1, 2]);
            h.update_section(&[3]);
            h.finalize()
        };

        let hash2 = {
            let mut h = StateHasher::new(b"test");
            h.update_section(&[1]);
            h.update_section(&[2, 3]);
            h.finalize()
        };

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_domain_separation() {
        let hash = |domain: &[u8]| {
            let mut h = StateHasher::new(domain);
            h.update_section(&[1, 2, 3, 4]);
            h.finalize()
        };
        assert_ne!(hash(b"DOMAIN_A"), hash(b"DOMAIN_B"));
    }

    #[test]
    fn test_compute_state_hash() {
        let hash = compute_state_hash(100, 3, |hasher| hasher.update_section(&[1]));
        let hash2 = compute_state_hash(100, 3, |hasher| hasher.update_section(&[1]));
        assert_eq!(hash, hash2);

        let hash3 = compute_state_hash(100, 4, |hasher| hasher.update_section(&[1]));
        assert_ne!(hash, hash3);
        assert_eq!(short_hex(&hash).len(), 12);
    }
}
