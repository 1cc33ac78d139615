//! Configuration for bloomstore
//!
//! Centralized configuration with sensible defaults.

/// Filter configuration
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Sizing Configuration
    // -------------------------------------------------------------------------
    /// Number of elements the filter is sized for (n)
    pub estimated_elements: u64,

    /// Target false positive rate at `estimated_elements` inserts (p)
    pub false_positive_rate: f32,

    // -------------------------------------------------------------------------
    // Disk Configuration
    // -------------------------------------------------------------------------
    /// How often an on-disk filter rewrites the insert counter in its footer
    pub counter_sync: CounterSync,
}

/// Footer counter sync strategy for on-disk filters
///
/// Bit mutations land in the mapped file immediately; only the insert counter
/// needs an explicit write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CounterSync {
    /// Rewrite the counter on every add (safest, slowest)
    #[default]
    EveryAdd,

    /// Rewrite the counter after N adds (balanced durability/performance)
    EveryNAdds { count: u64 },

    /// Only rewrite on `flush()`, `clear()`, and `destroy()`
    Manual,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            estimated_elements: 1_000_000,
            false_positive_rate: 0.01,
            counter_sync: CounterSync::EveryAdd,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the expected number of elements
    pub fn estimated_elements(mut self, n: u64) -> Self {
        self.config.estimated_elements = n;
        self
    }

    /// Set the target false positive rate
    pub fn false_positive_rate(mut self, p: f32) -> Self {
        self.config.false_positive_rate = p;
        self
    }

    /// Set the footer counter sync strategy
    pub fn counter_sync(mut self, strategy: CounterSync) -> Self {
        self.config.counter_sync = strategy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
