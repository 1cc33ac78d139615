//! Storage Module
//!
//! Persistence for filters: byte blob, hex transcript, file copy, and
//! memory-mapped file.
//!
//! ## File Format
//! Every encoding shares one layout. Integers are big-endian.
//! ```text
//! ┌────────────────────────────────────────┐
//! │ Bit Array (byte_length bytes)          │
//! ├────────────────────────────────────────┤
//! │ Footer (20 bytes)                      │
//! │ ┌──────────────┬─────────────┬───────┐ │
//! │ │ Estimated (8)│ Added (8)   │Rate(4)│ │
//! │ └──────────────┴─────────────┴───────┘ │
//! └────────────────────────────────────────┘
//! ```
//! The footer is read first; `byte_length` is re-derived from the estimated
//! element count and the f32 rate. The hex transcript is the same bytes in
//! lowercase hex.

mod blob;
mod disk;
mod footer;

pub use blob::{decode, decode_hex, encode, encode_hex, DecodedBlob};
pub use disk::{create_zeroed, read_file, write_file, DiskStore};
pub use footer::Footer;

/// Footer size in bytes
pub const FOOTER_SIZE: usize = 20;

/// Distance of the insert counter from the end of the file
pub(crate) const COUNTER_OFFSET_FROM_END: i64 = 12;
