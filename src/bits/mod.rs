//! Bit Array Module
//!
//! Byte-backed bit array addressed by raw 64-bit hashes reduced mod m.
//!
//! ## Responsibilities
//! - Set/test single bits (`byte[pos / 8] |= 1 << (pos % 8)`)
//! - Lock-free concurrent sets via per-byte `fetch_or`
//! - Zero the whole buffer on clear
//!
//! ## Backing Storage
//! ```text
//! BitBuffer
//!   ├── Owned   Box<[AtomicU8]>        (heap, in-memory filters)
//!   └── Mapped  MappedBits (MmapMut)   (the file's bit region, on-disk filters)
//! ```
//! Both variants are viewed as `&[AtomicU8]`; the algorithms do not care
//! which one they run on.
//!
//! ## Consistency
//! Tests use relaxed loads. A test racing with a set may or may not observe
//! it; a set is never lost.

mod mapped;

use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::{BloomError, Result};

pub use mapped::MappedBits;

/// Bit storage for a filter
#[derive(Debug)]
pub enum BitBuffer {
    /// Heap buffer owned by the filter
    Owned(Box<[AtomicU8]>),
    /// Memory-mapped file region
    Mapped(MappedBits),
}

impl BitBuffer {
    /// Allocate a zeroed owned buffer
    ///
    /// Fails with `InvalidParameters` when the allocator cannot provide
    /// `byte_length` bytes.
    pub fn zeroed(byte_length: usize) -> Result<Self> {
        let mut cells: Vec<AtomicU8> = Vec::new();
        cells.try_reserve_exact(byte_length).map_err(|e| {
            BloomError::InvalidParameters(format!(
                "cannot allocate a {} byte bit array: {}",
                byte_length, e
            ))
        })?;
        cells.extend((0..byte_length).map(|_| AtomicU8::new(0)));
        Ok(BitBuffer::Owned(cells.into_boxed_slice()))
    }

    /// Build an owned buffer from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Self {
        BitBuffer::Owned(bytes.iter().map(|&b| AtomicU8::new(b)).collect())
    }

    fn cells(&self) -> &[AtomicU8] {
        match self {
            BitBuffer::Owned(cells) => cells,
            BitBuffer::Mapped(mapped) => mapped.cells(),
        }
    }

    /// Buffer length in bytes
    pub fn len(&self) -> usize {
        self.cells().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells().is_empty()
    }

    /// Set the bit at `raw_hash mod number_bits`
    #[inline]
    pub fn set_bit(&self, number_bits: u64, raw_hash: u64) {
        let (byte, mask) = locate(number_bits, raw_hash);
        self.cells()[byte].fetch_or(mask, Ordering::Relaxed);
    }

    /// Test the bit at `raw_hash mod number_bits`
    #[inline]
    pub fn test_bit(&self, number_bits: u64, raw_hash: u64) -> bool {
        let (byte, mask) = locate(number_bits, raw_hash);
        self.cells()[byte].load(Ordering::Relaxed) & mask != 0
    }

    /// Zero every byte
    pub fn clear_all(&self) {
        for cell in self.cells() {
            cell.store(0, Ordering::Relaxed);
        }
    }

    /// Copy the current contents out
    pub fn snapshot(&self) -> Vec<u8> {
        self.cells()
            .iter()
            .map(|cell| cell.load(Ordering::Relaxed))
            .collect()
    }

    /// Number of set bits
    pub fn count_ones(&self) -> u64 {
        self.cells()
            .iter()
            .map(|cell| cell.load(Ordering::Relaxed).count_ones() as u64)
            .sum()
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self, BitBuffer::Mapped(_))
    }
}

/// Byte index and bit mask for a raw hash
#[inline]
fn locate(number_bits: u64, raw_hash: u64) -> (usize, u8) {
    let pos = raw_hash % number_bits;
    ((pos / 8) as usize, 1u8 << (pos % 8))
}
