//! Chained SHA-256 hasher
//!
//! Round 0 digests the element; round i digests round i-1's digest. Each
//! round contributes the first 8 digest bytes as a little-endian u64.

use sha2::{Digest, Sha256};

use super::BloomHasher;

/// Default hasher: chained SHA-256 digests
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainedDigest;

impl ChainedDigest {
    fn prefix(digest: &[u8]) -> u64 {
        let mut word = [0u8; 8];
        word.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(word)
    }
}

impl BloomHasher for ChainedDigest {
    fn hashes(&self, element: &[u8], count: u32) -> Vec<u64> {
        let mut results = Vec::with_capacity(count as usize);
        if count == 0 {
            return results;
        }

        let mut digest = Sha256::digest(element);
        results.push(Self::prefix(&digest));

        for _ in 1..count {
            digest = Sha256::digest(digest);
            results.push(Self::prefix(&digest));
        }

        results
    }
}
