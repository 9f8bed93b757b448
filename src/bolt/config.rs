//! Codec configuration.

use super::packstream::DEFAULT_MAX_NESTING_DEPTH;

/// Default maximum message size (16MB)
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Default maximum chunk size (16KB)
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 16 * 1024;

/// Limits applied by [`BoltCodec`](super::BoltCodec).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Maximum container nesting depth when decoding
    pub max_nesting_depth: usize,
    /// Maximum reassembled message size
    pub max_message_size: usize,
    /// Maximum payload per outgoing chunk (at most `u16::MAX`)
    pub max_chunk_size: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
        }
    }
}

impl CodecConfig {
    /// Start a builder from the defaults.
    pub fn builder() -> CodecConfigBuilder {
        CodecConfigBuilder::default()
    }
}

/// Builder for [`CodecConfig`].
#[derive(Debug, Default)]
pub struct CodecConfigBuilder {
    config: CodecConfig,
}

impl CodecConfigBuilder {
    /// Set the maximum nesting depth.
    pub fn max_nesting_depth(mut self, depth: usize) -> Self {
        self.config.max_nesting_depth = depth;
        self
    }

    /// Set the maximum message size.
    pub fn max_message_size(mut self, size: usize) -> Self {
        self.config.max_message_size = size;
        self
    }

    /// Set the maximum chunk size. Clamped to `1..=u16::MAX`.
    pub fn max_chunk_size(mut self, size: usize) -> Self {
        self.config.max_chunk_size = size.clamp(1, u16::MAX as usize);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> CodecConfig {
        self.config
    }
}
