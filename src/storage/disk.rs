//! File-backed storage
//!
//! Two ways of putting a filter on disk:
//! - `write_file` / `read_file`: the whole blob is copied to or from a file
//!   and the filter keeps an owned buffer.
//! - `DiskStore`: the bit region is memory-mapped and the file IS the live
//!   filter. Only the insert counter needs writing back, which `DiskStore`
//!   does under its own mutex.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::bits::MappedBits;
use crate::config::CounterSync;
use crate::error::{BloomError, Result};
use crate::params::FilterParams;

use super::{Footer, COUNTER_OFFSET_FROM_END, FOOTER_SIZE};

/// Write a bit array and footer to `path`, replacing any existing file
pub fn write_file(path: &Path, bits: &[u8], footer: &Footer) -> Result<()> {
    let file = File::create(path).map_err(|e| BloomError::io(path, e))?;
    let mut writer = BufWriter::new(file);

    writer.write_all(bits).map_err(|e| BloomError::io(path, e))?;
    writer
        .write_all(&footer.encode())
        .map_err(|e| BloomError::io(path, e))?;

    let file = writer
        .into_inner()
        .map_err(|e| BloomError::io(path, e.into_error()))?;
    file.sync_all().map_err(|e| BloomError::io(path, e))?;
    Ok(())
}

/// Create `path` holding a zeroed bit array of `byte_length` bytes and footer
///
/// A file that was created but could not be filled is removed again.
pub fn create_zeroed(path: &Path, byte_length: u64, footer: &Footer) -> Result<()> {
    let file = File::create(path).map_err(|e| BloomError::io(path, e))?;

    fill_zeroed(file, byte_length, footer).map_err(|e| {
        if let Err(remove) = std::fs::remove_file(path) {
            warn!(path = %path.display(), error = %remove, "failed to remove partial filter file");
        }
        BloomError::io(path, e)
    })
}

fn fill_zeroed(mut file: File, byte_length: u64, footer: &Footer) -> std::io::Result<()> {
    // Extending the file fills the bit region with zeros
    file.set_len(byte_length)?;
    file.seek(SeekFrom::Start(byte_length))?;
    file.write_all(&footer.encode())?;
    file.sync_all()
}

/// Read a whole filter file into memory
pub fn read_file(path: &Path) -> Result<(Footer, FilterParams, Vec<u8>)> {
    let mut file = File::open(path).map_err(|e| BloomError::io(path, e))?;
    let (footer, params) = read_footer(&mut file, path)?;

    file.seek(SeekFrom::Start(0))
        .map_err(|e| BloomError::io(path, e))?;
    let mut bits = vec![0u8; params.byte_length as usize];
    file.read_exact(&mut bits)
        .map_err(|e| BloomError::io(path, e))?;

    Ok((footer, params, bits))
}

/// Read the footer from the end of `file` and validate the file size
fn read_footer(file: &mut File, path: &Path) -> Result<(Footer, FilterParams)> {
    let file_size = file.metadata().map_err(|e| BloomError::io(path, e))?.len();
    if file_size < FOOTER_SIZE as u64 {
        return Err(BloomError::MalformedEncoding(format!(
            "{} is {} bytes, shorter than the {} byte footer",
            path.display(),
            file_size,
            FOOTER_SIZE
        )));
    }

    file.seek(SeekFrom::End(-(FOOTER_SIZE as i64)))
        .map_err(|e| BloomError::io(path, e))?;
    let mut bytes = [0u8; FOOTER_SIZE];
    file.read_exact(&mut bytes)
        .map_err(|e| BloomError::io(path, e))?;

    let footer = Footer::decode(&bytes)?;
    let params = footer.params()?;

    if file_size != Footer::encoded_len(&params) {
        return Err(BloomError::MalformedEncoding(format!(
            "{} is {} bytes, footer describes {}",
            path.display(),
            file_size,
            Footer::encoded_len(&params)
        )));
    }

    Ok((footer, params))
}

/// Open handle on a memory-mapped filter file
///
/// ## Concurrency:
/// - `file`: Mutex around the seek + write of the footer counter
/// - `unsynced`: adds since the counter was last written (atomic, lock-free)
/// - Bit mutations never touch this struct
#[derive(Debug)]
pub struct DiskStore {
    path: PathBuf,
    file: Mutex<File>,
    counter_sync: CounterSync,
    unsynced: AtomicU64,
}

impl DiskStore {
    /// Open `path` read-write and map its bit region
    pub fn open(path: &Path, counter_sync: CounterSync) -> Result<(Self, Footer, FilterParams, MappedBits)> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| BloomError::io(path, e))?;

        let (footer, params) = read_footer(&mut file, path)?;
        let bits = MappedBits::map(&file, params.byte_length as usize)
            .map_err(|e| BloomError::io(path, e))?;

        debug!(
            path = %path.display(),
            bytes = params.byte_length,
            "mapped filter bit region"
        );

        let store = Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
            counter_sync,
            unsynced: AtomicU64::new(0),
        };
        Ok((store, footer, params, bits))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn counter_sync(&self) -> CounterSync {
        self.counter_sync
    }

    /// Note one add and write the counter if the sync strategy asks for it
    pub fn record_add(&self, counter: &AtomicU64) -> Result<()> {
        let unsynced = self.unsynced.fetch_add(1, Ordering::AcqRel) + 1;
        let due = match self.counter_sync {
            CounterSync::EveryAdd => true,
            CounterSync::EveryNAdds { count } => unsynced >= count.max(1),
            CounterSync::Manual => false,
        };
        if due {
            self.persist_counter(counter)?;
        }
        Ok(())
    }

    /// Whether adds happened since the counter was last written
    pub fn has_unsynced(&self) -> bool {
        self.unsynced.load(Ordering::Acquire) > 0
    }

    /// Write the current counter value into the footer
    ///
    /// The value is read while holding the lock, so concurrent writers
    /// never move the stored counter backwards.
    pub fn persist_counter(&self, counter: &AtomicU64) -> Result<()> {
        let mut file = self.file.lock();
        self.unsynced.store(0, Ordering::Release);
        let value = counter.load(Ordering::Acquire);

        file.seek(SeekFrom::End(-COUNTER_OFFSET_FROM_END))
            .map_err(|e| BloomError::io(&self.path, e))?;
        file.write_all(&value.to_be_bytes())
            .map_err(|e| BloomError::io(&self.path, e))?;
        Ok(())
    }

    /// Force the file contents to stable storage
    pub fn sync_all(&self) -> Result<()> {
        self.file
            .lock()
            .sync_all()
            .map_err(|e| BloomError::io(&self.path, e))
    }
}
