//! # bloomstore
//!
//! A Bloom filter with:
//! - Optimal sizing from a capacity and target false positive rate
//! - Pluggable hashing (chained SHA-256 by default)
//! - Lock-free concurrent inserts
//! - Blob, hex, file, and memory-mapped persistence
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       BloomFilter                            │
//! │            (add / check / clear / export / stats)            │
//! └──────┬──────────────────┬──────────────────┬────────────────┘
//!        │                  │                  │
//!        ▼                  ▼                  ▼
//!  ┌───────────┐     ┌─────────────┐    ┌─────────────┐
//!  │  params   │     │    hash     │    │   storage   │
//!  │  (m, k)   │     │ (k rounds)  │    │ blob / hex  │
//!  └───────────┘     └─────────────┘    │ file / mmap │
//!                                       └──────┬──────┘
//!                                              │
//!                                              ▼
//!                                       ┌─────────────┐
//!                                       │    bits     │
//!                                       │ (AtomicU8)  │
//!                                       └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use bloomstore::{BloomFilter, Membership};
//!
//! let filter = BloomFilter::new(1000, 0.01)?;
//! filter.add("hello")?;
//! assert_eq!(filter.check("hello")?, Membership::PossiblyPresent);
//! # Ok::<(), bloomstore::BloomError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod params;
pub mod hash;
pub mod bits;
pub mod storage;
pub mod filter;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{BloomError, Result};
pub use config::{Config, CounterSync};
pub use filter::{BloomFilter, Membership, Stats, StorageMode};
pub use hash::{BloomHasher, ChainedDigest};
pub use params::FilterParams;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of bloomstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
