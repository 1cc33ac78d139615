//! In-memory blob and hex transcript encodings

use crate::error::{BloomError, Result};
use crate::params::FilterParams;

use super::{Footer, FOOTER_SIZE};

/// A decoded blob borrowing its bit array from the input
#[derive(Debug)]
pub struct DecodedBlob<'a> {
    pub footer: Footer,
    pub params: FilterParams,
    pub bits: &'a [u8],
}

/// Concatenate the bit array and its footer
pub fn encode(bits: &[u8], footer: &Footer) -> Vec<u8> {
    let mut blob = Vec::with_capacity(bits.len() + FOOTER_SIZE);
    blob.extend_from_slice(bits);
    blob.extend_from_slice(&footer.encode());
    blob
}

/// Split a blob into footer, re-derived sizing, and bit array
///
/// The blob length must equal `byte_length + FOOTER_SIZE` for the sizing the
/// footer describes.
pub fn decode(blob: &[u8]) -> Result<DecodedBlob<'_>> {
    if blob.len() < FOOTER_SIZE {
        return Err(BloomError::MalformedEncoding(format!(
            "encoding is {} bytes, shorter than the {} byte footer",
            blob.len(),
            FOOTER_SIZE
        )));
    }

    let (bits, footer_bytes) = blob.split_at(blob.len() - FOOTER_SIZE);
    let footer = Footer::decode(footer_bytes)?;
    let params = footer.params()?;

    if bits.len() as u64 != params.byte_length {
        return Err(BloomError::MalformedEncoding(format!(
            "bit array is {} bytes, footer describes {}",
            bits.len(),
            params.byte_length
        )));
    }

    Ok(DecodedBlob {
        footer,
        params,
        bits,
    })
}

/// Lowercase hex of the blob, two characters per byte, no separators
pub fn encode_hex(bits: &[u8], footer: &Footer) -> String {
    hex::encode(encode(bits, footer))
}

/// Decode a hex transcript back into blob bytes
pub fn decode_hex(transcript: &str) -> Result<Vec<u8>> {
    hex::decode(transcript)
        .map_err(|e| BloomError::MalformedEncoding(format!("invalid hex transcript: {}", e)))
}
