use peerwire_compress::Algorithm;

use crate::message_type::is_compressible;

/// Payloads up to this size are sent uncompressed by default.
pub const DEFAULT_MIN_COMPRESS_SIZE: usize = 70;

/// When an outbound message is worth compressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionPolicy {
    /// Master switch. When off, messages are always sent uncompressed.
    pub enabled: bool,
    /// Payloads of this size or smaller are never compressed. Default: 70 bytes.
    pub min_payload_size: usize,
    /// Algorithm used for eligible payloads.
    pub algorithm: Algorithm,
}

impl CompressionPolicy {
    /// A policy that never compresses.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Whether a payload of `payload_size` bytes of type `message_type`
    /// should be compressed.
    pub fn is_eligible(&self, message_type: u16, payload_size: usize) -> bool {
        self.enabled && payload_size > self.min_payload_size && is_compressible(message_type)
    }
}

impl Default for CompressionPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            min_payload_size: DEFAULT_MIN_COMPRESS_SIZE,
            algorithm: Algorithm::Lz4,
        }
    }
}
