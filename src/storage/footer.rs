//! Footer encoding
//!
//! The trailing 20 bytes of every encoding. All fields are big-endian.

use bytes::{Buf, BufMut};

use crate::error::{BloomError, Result};
use crate::params::{self, FilterParams};

use super::FOOTER_SIZE;

/// Sizing inputs and insert counter persisted after the bit array
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footer {
    pub estimated_elements: u64,
    pub elements_added: u64,
    pub false_positive_probability: f32,
}

impl Footer {
    /// Encode as `[estimated (8)][added (8)][rate bits (4)]`
    pub fn encode(&self) -> [u8; FOOTER_SIZE] {
        let mut out = [0u8; FOOTER_SIZE];
        let mut buf = &mut out[..];
        buf.put_u64(self.estimated_elements);
        buf.put_u64(self.elements_added);
        buf.put_f32(self.false_positive_probability);
        out
    }

    /// Decode exactly `FOOTER_SIZE` bytes
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != FOOTER_SIZE {
            return Err(BloomError::MalformedEncoding(format!(
                "footer must be {} bytes, got {}",
                FOOTER_SIZE,
                bytes.len()
            )));
        }
        let mut buf = bytes;
        Ok(Self {
            estimated_elements: buf.get_u64(),
            elements_added: buf.get_u64(),
            false_positive_probability: buf.get_f32(),
        })
    }

    /// Re-derive the filter sizing recorded by this footer
    ///
    /// Fails with `MalformedEncoding` when the stored capacity or rate could
    /// never have produced a filter.
    pub fn params(&self) -> Result<FilterParams> {
        params::derive(self.estimated_elements, self.false_positive_probability).map_err(|e| {
            BloomError::MalformedEncoding(format!("undecodable footer: {}", e))
        })
    }

    /// Total encoded size for a filter described by this footer
    pub fn encoded_len(params: &FilterParams) -> u64 {
        params.byte_length + FOOTER_SIZE as u64
    }
}
