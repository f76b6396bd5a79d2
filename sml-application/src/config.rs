//! Parser and generator configuration

use serde::{Deserialize, Serialize};
use sml_codec::tlv::tree::DEFAULT_MAX_DEPTH;

/// Default number of random digits in a transaction id prefix
pub const DEFAULT_PREFIX_LENGTH: usize = 7;

/// Parser configuration
///
/// All fields have defaults, so a partial document deserializes into a
/// usable configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Treat CRC mismatches as errors and drop the affected messages
    pub strict_crc: bool,
    /// Compare the CRC element of each message with the computed one
    pub verify_message_crc: bool,
    /// Maximum list nesting depth
    pub max_depth: usize,
}

impl ParserConfig {
    /// Lenient configuration: CRC mismatches are reported as warnings
    pub fn new() -> Self {
        Self {
            strict_crc: false,
            verify_message_crc: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Configuration rejecting every CRC mismatch
    pub fn strict() -> Self {
        Self::new().with_strict_crc(true)
    }

    pub fn with_strict_crc(mut self, strict: bool) -> Self {
        self.strict_crc = strict;
        self
    }

    pub fn with_message_crc(mut self, verify: bool) -> Self {
        self.verify_message_crc = verify;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Transaction id generator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrxConfig {
    pub prefix_length: usize,
}

impl TrxConfig {
    pub fn new() -> Self {
        Self {
            prefix_length: DEFAULT_PREFIX_LENGTH,
        }
    }

    pub fn with_prefix_length(mut self, prefix_length: usize) -> Self {
        self.prefix_length = prefix_length;
        self
    }
}

impl Default for TrxConfig {
    fn default() -> Self {
        Self::new()
    }
}
