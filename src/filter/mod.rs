//! Filter Module
//!
//! The public Bloom filter: sizing, hashing, bit array, and persistence
//! composed into one structure.
//!
//! ## Concurrency Model
//!
//! - **Adds/Checks**: `&self`, safe from many threads (share via `Arc`)
//!   - Bits are set with per-byte atomic `fetch_or`
//!   - `elements_added` is an `AtomicU64`
//!   - On-disk footer counter writes are serialized by `DiskStore`'s mutex,
//!     separately from the bit path
//! - **Clear / hasher swap**: `&mut self`, exclusive by construction
//!
//! A check racing with an add may or may not observe it.

mod stats;

use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::bits::BitBuffer;
use crate::config::{Config, CounterSync};
use crate::error::{BloomError, Result};
use crate::hash::{BloomHasher, ChainedDigest};
use crate::params::{self, FilterParams};
use crate::storage::{self, DiskStore, Footer, FOOTER_SIZE};

pub use stats::Stats;

/// Outcome of a membership check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    /// Every probed bit was set (could be a false positive)
    PossiblyPresent,
    /// At least one probed bit was clear (never a false negative)
    DefinitelyAbsent,
}

impl Membership {
    pub fn is_possibly_present(self) -> bool {
        self == Membership::PossiblyPresent
    }
}

/// Where the bit array lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// Heap buffer owned by the filter
    InMemory,
    /// Memory-mapped file; mutations land in the file directly
    OnDisk,
}

/// Bloom filter with fixed capacity and target false positive rate
pub struct BloomFilter {
    estimated_elements: u64,
    false_positive_probability: f32,
    params: FilterParams,
    bits: BitBuffer,
    elements_added: AtomicU64,
    hasher: Arc<dyn BloomHasher>,
    /// Present only for memory-mapped filters
    disk: Option<DiskStore>,
}

impl BloomFilter {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Create an in-memory filter sized for `estimated_elements` at rate
    /// `false_positive_rate`
    pub fn new(estimated_elements: u64, false_positive_rate: f32) -> Result<Self> {
        let params = params::derive(estimated_elements, false_positive_rate)?;
        let bits = BitBuffer::zeroed(params.byte_length as usize)?;
        debug!(
            estimated_elements,
            false_positive_rate,
            bits = params.number_bits,
            hashes = params.number_hashes,
            "created in-memory filter"
        );
        Ok(Self::assemble(
            estimated_elements,
            false_positive_rate,
            params,
            bits,
            0,
            None,
        ))
    }

    /// Create an in-memory filter from a config
    pub fn with_config(config: &Config) -> Result<Self> {
        Self::new(config.estimated_elements, config.false_positive_rate)
    }

    /// Create a filter file at `path` and open it memory-mapped
    ///
    /// An existing file at `path` is replaced.
    pub fn create_on_disk(
        path: impl AsRef<Path>,
        estimated_elements: u64,
        false_positive_rate: f32,
    ) -> Result<Self> {
        let config = Config::builder()
            .estimated_elements(estimated_elements)
            .false_positive_rate(false_positive_rate)
            .build();
        Self::create_on_disk_with_config(path, &config)
    }

    /// Create a filter file at `path` from a config and open it memory-mapped
    pub fn create_on_disk_with_config(path: impl AsRef<Path>, config: &Config) -> Result<Self> {
        let path = path.as_ref();
        let params = params::derive(config.estimated_elements, config.false_positive_rate)?;
        let footer = Footer {
            estimated_elements: config.estimated_elements,
            elements_added: 0,
            false_positive_probability: config.false_positive_rate,
        };

        storage::create_zeroed(path, params.byte_length, &footer)?;
        debug!(path = %path.display(), bytes = params.byte_length, "created filter file");

        Self::open_on_disk_with_sync(path, config.counter_sync).map_err(|e| {
            // Do not leave a file behind that no filter owns
            if let Err(remove) = std::fs::remove_file(path) {
                warn!(path = %path.display(), error = %remove, "failed to remove filter file");
            }
            e
        })
    }

    /// Open an existing filter file memory-mapped
    pub fn open_on_disk(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_on_disk_with_sync(path, CounterSync::default())
    }

    /// Open an existing filter file memory-mapped with a counter sync strategy
    pub fn open_on_disk_with_sync(path: impl AsRef<Path>, counter_sync: CounterSync) -> Result<Self> {
        let path = path.as_ref();
        let (store, footer, params, mapped) = DiskStore::open(path, counter_sync)?;
        debug!(
            path = %path.display(),
            elements_added = footer.elements_added,
            ?counter_sync,
            "opened filter on disk"
        );
        Ok(Self::assemble(
            footer.estimated_elements,
            footer.false_positive_probability,
            params,
            BitBuffer::Mapped(mapped),
            footer.elements_added,
            Some(store),
        ))
    }

    /// Load a filter file into memory
    pub fn import_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let (footer, params, bits) = storage::read_file(path)?;
        debug!(path = %path.display(), elements_added = footer.elements_added, "imported filter file");
        Ok(Self::from_parts(footer, params, &bits))
    }

    /// Rebuild a filter from `export_blob` output
    pub fn import_from_blob(blob: &[u8]) -> Result<Self> {
        let decoded = storage::decode(blob)?;
        Ok(Self::from_parts(decoded.footer, decoded.params, decoded.bits))
    }

    /// Rebuild a filter from `export_to_hex` output
    pub fn import_from_hex(transcript: &str) -> Result<Self> {
        let blob = storage::decode_hex(transcript)?;
        Self::import_from_blob(&blob)
    }

    fn from_parts(footer: Footer, params: FilterParams, bits: &[u8]) -> Self {
        Self::assemble(
            footer.estimated_elements,
            footer.false_positive_probability,
            params,
            BitBuffer::from_bytes(bits),
            footer.elements_added,
            None,
        )
    }

    fn assemble(
        estimated_elements: u64,
        false_positive_probability: f32,
        params: FilterParams,
        bits: BitBuffer,
        elements_added: u64,
        disk: Option<DiskStore>,
    ) -> Self {
        Self {
            estimated_elements,
            false_positive_probability,
            params,
            bits,
            elements_added: AtomicU64::new(elements_added),
            hasher: Arc::new(ChainedDigest),
            disk,
        }
    }

    // =========================================================================
    // Hash Strategy
    // =========================================================================

    /// Replace the hash strategy
    pub fn set_hash_function(&mut self, hasher: Arc<dyn BloomHasher>) {
        self.hasher = hasher;
    }

    /// Builder-style `set_hash_function`, for use right after construction
    pub fn with_hash_function(mut self, hasher: Arc<dyn BloomHasher>) -> Self {
        self.set_hash_function(hasher);
        self
    }

    /// Reinstall the default chained-digest hasher
    pub fn reset_hash_function(&mut self) {
        self.hasher = Arc::new(ChainedDigest);
    }

    /// Run the installed hasher for `count` rounds
    pub fn compute_hashes(&self, element: impl AsRef<[u8]>, count: u32) -> Vec<u64> {
        self.hasher.hashes(element.as_ref(), count)
    }

    // =========================================================================
    // Add / Check
    // =========================================================================

    /// Insert an element
    pub fn add(&self, element: impl AsRef<[u8]>) -> Result<()> {
        let hashes = self.compute_hashes(element, self.params.number_hashes);
        self.add_with_hashes(&hashes)
    }

    /// Insert using precomputed hashes
    ///
    /// Fails with `InsufficientHashes`, changing nothing, when fewer than
    /// `number_hashes` values are supplied. Extra values are ignored.
    pub fn add_with_hashes(&self, hashes: &[u64]) -> Result<()> {
        let hashes = self.rounds(hashes)?;
        for &hash in hashes {
            self.bits.set_bit(self.params.number_bits, hash);
        }
        self.elements_added.fetch_add(1, Ordering::AcqRel);

        if let Some(disk) = &self.disk {
            disk.record_add(&self.elements_added)?;
        }
        Ok(())
    }

    /// Check whether an element may have been inserted
    pub fn check(&self, element: impl AsRef<[u8]>) -> Result<Membership> {
        let hashes = self.compute_hashes(element, self.params.number_hashes);
        self.check_with_hashes(&hashes)
    }

    /// Check using precomputed hashes
    pub fn check_with_hashes(&self, hashes: &[u64]) -> Result<Membership> {
        let hashes = self.rounds(hashes)?;
        let present = hashes
            .iter()
            .all(|&hash| self.bits.test_bit(self.params.number_bits, hash));

        Ok(if present {
            Membership::PossiblyPresent
        } else {
            Membership::DefinitelyAbsent
        })
    }

    /// The first `number_hashes` values, or `InsufficientHashes`
    fn rounds<'a>(&self, hashes: &'a [u64]) -> Result<&'a [u64]> {
        let required = self.params.number_hashes;
        if hashes.len() < required as usize {
            return Err(BloomError::InsufficientHashes {
                required,
                supplied: hashes.len(),
            });
        }
        Ok(&hashes[..required as usize])
    }

    // =========================================================================
    // Clear / Flush / Destroy
    // =========================================================================

    /// Zero every bit and reset the insert counter
    pub fn clear(&mut self) -> Result<()> {
        self.bits.clear_all();
        self.elements_added.store(0, Ordering::Release);
        if let Some(disk) = &self.disk {
            disk.persist_counter(&self.elements_added)?;
        }
        debug!(on_disk = self.is_on_disk(), "cleared filter");
        Ok(())
    }

    /// Push an on-disk filter's bits and counter to stable storage
    ///
    /// No-op for in-memory filters.
    pub fn flush(&self) -> Result<()> {
        let Some(disk) = &self.disk else {
            return Ok(());
        };
        if let BitBuffer::Mapped(mapped) = &self.bits {
            mapped.flush().map_err(|e| BloomError::io(disk.path(), e))?;
        }
        disk.persist_counter(&self.elements_added)?;
        disk.sync_all()
    }

    /// Release the filter
    ///
    /// On-disk filters write any deferred counter update before the mapping
    /// is dropped and the file closed. Consuming `self` rules out use after
    /// destruction.
    pub fn destroy(self) -> Result<()> {
        if let Some(disk) = &self.disk {
            if disk.has_unsynced() {
                disk.persist_counter(&self.elements_added)?;
            }
            debug!(path = %disk.path().display(), "closing filter file");
        }
        Ok(())
    }

    // =========================================================================
    // Export
    // =========================================================================

    fn footer(&self) -> Footer {
        Footer {
            estimated_elements: self.estimated_elements,
            elements_added: self.elements_added(),
            false_positive_probability: self.false_positive_probability,
        }
    }

    /// Write the filter to `path`
    ///
    /// Succeeds without writing when the filter is already on disk: the
    /// mapped file is the live filter.
    pub fn export_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if self.is_on_disk() {
            debug!(path = %path.display(), "filter already on disk, export skipped");
            return Ok(());
        }
        storage::write_file(path, &self.bits.snapshot(), &self.footer())?;
        debug!(path = %path.display(), bytes = self.export_size(), "exported filter");
        Ok(())
    }

    /// Bit array followed by the footer
    pub fn export_blob(&self) -> Vec<u8> {
        storage::encode(&self.bits.snapshot(), &self.footer())
    }

    /// `export_blob` as lowercase hex
    pub fn export_to_hex(&self) -> String {
        storage::encode_hex(&self.bits.snapshot(), &self.footer())
    }

    /// Encoded size in bytes (bit array plus footer)
    pub fn export_size(&self) -> u64 {
        self.params.byte_length + FOOTER_SIZE as u64
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn estimated_elements(&self) -> u64 {
        self.estimated_elements
    }

    pub fn false_positive_probability(&self) -> f32 {
        self.false_positive_probability
    }

    pub fn number_bits(&self) -> u64 {
        self.params.number_bits
    }

    pub fn number_hashes(&self) -> u32 {
        self.params.number_hashes
    }

    pub fn byte_length(&self) -> u64 {
        self.params.byte_length
    }

    pub fn params(&self) -> FilterParams {
        self.params
    }

    pub fn elements_added(&self) -> u64 {
        self.elements_added.load(Ordering::Acquire)
    }

    /// Number of set bits
    pub fn count_set_bits(&self) -> u64 {
        self.bits.count_ones()
    }

    pub fn storage_mode(&self) -> StorageMode {
        if self.bits.is_mapped() {
            StorageMode::OnDisk
        } else {
            StorageMode::InMemory
        }
    }

    pub fn is_on_disk(&self) -> bool {
        self.storage_mode() == StorageMode::OnDisk
    }

    /// Backing file of an on-disk filter
    pub fn path(&self) -> Option<&Path> {
        self.disk.as_ref().map(|disk| disk.path())
    }

    /// Estimated false positive rate at the current insert count
    pub fn current_false_positive_rate(&self) -> f64 {
        params::estimate_false_positive_rate(
            self.params.number_bits,
            self.params.number_hashes,
            self.elements_added(),
        )
    }

    /// Snapshot of every scalar attribute
    pub fn stats(&self) -> Stats {
        Stats {
            number_bits: self.params.number_bits,
            estimated_elements: self.estimated_elements,
            number_hashes: self.params.number_hashes,
            false_positive_probability: self.false_positive_probability,
            byte_length: self.params.byte_length,
            elements_added: self.elements_added(),
            current_false_positive_rate: self.current_false_positive_rate(),
            export_size: self.export_size(),
            on_disk: self.is_on_disk(),
        }
    }
}

impl Drop for BloomFilter {
    fn drop(&mut self) {
        if let Some(disk) = &self.disk {
            if disk.has_unsynced() {
                if let Err(e) = disk.persist_counter(&self.elements_added) {
                    warn!(error = %e, "failed to persist filter counter on drop");
                }
            }
        }
    }
}

impl fmt::Debug for BloomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BloomFilter")
            .field("estimated_elements", &self.estimated_elements)
            .field("false_positive_probability", &self.false_positive_probability)
            .field("params", &self.params)
            .field("elements_added", &self.elements_added())
            .field("storage_mode", &self.storage_mode())
            .finish_non_exhaustive()
    }
}
