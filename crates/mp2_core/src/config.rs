//! Decoder configuration.

/// Default constants used when decoding.
pub mod defaults {
    /// Maximum nesting of sequences and mappings accepted while decoding.
    pub const MAX_DEPTH: usize = 128;
}

/// Limits applied while decoding untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Maximum container nesting depth. The top-level value is at depth 0.
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: defaults::MAX_DEPTH,
        }
    }
}

impl Config {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
