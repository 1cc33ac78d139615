//! Optimal Bloom filter parameter derivation
//!
//! Formulas:
//! - m = ceil(-n * ln(p) / (ln 2)^2)   -- optimal bits
//! - k = round(ln 2 * m / n)           -- optimal hash rounds
//! - byte_length = ceil(m / 8)
//!
//! The rate is taken as `f32` because that is the precision the footer
//! persists; widening the same `f32` on every derivation keeps re-derivation
//! after import exact.

use std::f64::consts::LN_2;

use crate::error::{BloomError, Result};

/// Derived sizing for a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterParams {
    /// Addressable bit positions (m)
    pub number_bits: u64,
    /// Hash rounds per operation (k)
    pub number_hashes: u32,
    /// Backing buffer size in bytes
    pub byte_length: u64,
}

/// Derive optimal (m, k, byte_length) for `n` elements at rate `p`
///
/// Fails with `InvalidParameters` unless `n > 0` and `0 < p < 1`.
/// A k that rounds to zero is clamped to one.
pub fn derive(estimated_elements: u64, false_positive_rate: f32) -> Result<FilterParams> {
    if estimated_elements == 0 {
        return Err(BloomError::InvalidParameters(
            "estimated elements must be greater than zero".to_string(),
        ));
    }
    if !(false_positive_rate > 0.0 && false_positive_rate < 1.0) {
        return Err(BloomError::InvalidParameters(format!(
            "false positive rate must be in (0, 1), got {}",
            false_positive_rate
        )));
    }

    let n = estimated_elements as f64;
    let p = false_positive_rate as f64;

    let bits = (-n * p.ln() / (LN_2 * LN_2)).ceil();
    if !bits.is_finite() || bits >= u64::MAX as f64 || bits / 8.0 >= usize::MAX as f64 {
        return Err(BloomError::InvalidParameters(format!(
            "{} elements at rate {} needs more bits than can be addressed",
            estimated_elements, false_positive_rate
        )));
    }
    let number_bits = bits as u64;

    let hashes = (LN_2 * number_bits as f64 / n).round();
    let number_hashes = (hashes as u32).max(1);

    Ok(FilterParams {
        number_bits,
        number_hashes,
        byte_length: number_bits.div_ceil(8),
    })
}

/// Estimate the false positive rate after `elements_added` inserts
///
/// Formula: (1 - e^(-k*n/m))^k
pub fn estimate_false_positive_rate(number_bits: u64, number_hashes: u32, elements_added: u64) -> f64 {
    if number_bits == 0 {
        return 1.0;
    }
    let k = number_hashes as f64;
    let exponent = -k * elements_added as f64 / number_bits as f64;
    (1.0 - exponent.exp()).powi(number_hashes as i32)
}
