//! Hash Module
//!
//! Turns one element into k raw 64-bit bit-position seeds.
//!
//! ## Responsibilities
//! - Define the pluggable hasher contract (`BloomHasher`)
//! - Provide the default chained-digest scheme
//!
//! Every raw value is reduced mod m by the bit array, so a hasher only has to
//! be deterministic and reasonably uniform over 64 bits.

mod digest;

pub use digest::ChainedDigest;

/// Strategy that derives `count` raw hash values for an element
///
/// Implementations must return the same output for the same
/// `(element, count)`. Returning fewer than `count` values makes the
/// filter reject the operation with `InsufficientHashes`.
pub trait BloomHasher: Send + Sync {
    fn hashes(&self, element: &[u8], count: u32) -> Vec<u64>;
}

impl<F> BloomHasher for F
where
    F: Fn(&[u8], u32) -> Vec<u64> + Send + Sync,
{
    fn hashes(&self, element: &[u8], count: u32) -> Vec<u64> {
        self(element, count)
    }
}
