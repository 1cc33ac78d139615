//! Memory-mapped bit region
//!
//! Wraps a writable shared mapping of the first `byte_length` bytes of a
//! filter file. Writes go straight to the page cache.

use std::fs::File;
use std::ptr::NonNull;
use std::sync::atomic::AtomicU8;

use memmap2::{MmapMut, MmapOptions};

/// Shared read-write mapping viewed as atomic bytes
pub struct MappedBits {
    map: MmapMut,
    ptr: NonNull<AtomicU8>,
    len: usize,
}

// SAFETY: every access after construction goes through `&[AtomicU8]`; the
// raw pointer stays valid for as long as `map` is alive.
unsafe impl Send for MappedBits {}
unsafe impl Sync for MappedBits {}

impl MappedBits {
    /// Map `len` bytes from the start of `file`
    ///
    /// The file must be open read-write and at least `len` bytes long.
    pub fn map(file: &File, len: usize) -> std::io::Result<Self> {
        // SAFETY: the filter owns the file handle for the mapping's lifetime.
        // Other processes truncating the file underneath us is not supported.
        let mut map = unsafe { MmapOptions::new().len(len).map_mut(file)? };
        let ptr = NonNull::new(map.as_mut_ptr() as *mut AtomicU8).ok_or_else(|| {
            std::io::Error::other("mmap returned a null pointer")
        })?;
        Ok(Self { map, ptr, len })
    }

    pub(super) fn cells(&self) -> &[AtomicU8] {
        // SAFETY: AtomicU8 has the same layout as u8, and the pointer was
        // obtained mutably so shared atomic writes through it are permitted.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Flush dirty pages to disk
    pub fn flush(&self) -> std::io::Result<()> {
        self.map.flush()
    }
}

impl std::fmt::Debug for MappedBits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedBits").field("len", &self.len).finish()
    }
}
