//! Human-readable filter statistics

use std::fmt;

/// Point-in-time snapshot of a filter's attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub number_bits: u64,
    pub estimated_elements: u64,
    pub number_hashes: u32,
    pub false_positive_probability: f32,
    pub byte_length: u64,
    pub elements_added: u64,
    pub current_false_positive_rate: f64,
    pub export_size: u64,
    pub on_disk: bool,
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BloomFilter")?;
        writeln!(f, "    bits: {}", self.number_bits)?;
        writeln!(f, "    estimated elements: {}", self.estimated_elements)?;
        writeln!(f, "    number hashes: {}", self.number_hashes)?;
        writeln!(f, "    max false positive rate: {:.6}", self.false_positive_probability)?;
        writeln!(f, "    bloom length (8 bits): {}", self.byte_length)?;
        writeln!(f, "    elements added: {}", self.elements_added)?;
        writeln!(f, "    current false positive rate: {:.6}", self.current_false_positive_rate)?;
        writeln!(f, "    export size (bytes): {}", self.export_size)?;
        write!(f, "    is on disk: {}", if self.on_disk { "yes" } else { "no" })
    }
}
