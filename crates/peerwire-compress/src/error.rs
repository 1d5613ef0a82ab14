/// Errors raised while compressing or decompressing a payload.
///
/// These stay inside the crate's fallible entry points; the top-level
/// [`compress`](crate::compress) and [`decompress`](crate::decompress) report
/// failure as an absent size instead.
#[derive(Debug, thiserror::Error)]
pub enum CompressError {
    /// The input does not fit the 32-bit original-size prefix.
    #[error("input too large to compress ({size} bytes, max {max})")]
    InvalidSize { size: usize, max: usize },

    /// The LZ4 frame encoder reported an error.
    #[error("lz4 frame compression failed: {0}")]
    CompressionFailed(String),

    /// The varint original-size prefix is missing, unterminated or out of range.
    #[error("malformed original-size header")]
    MalformedHeader,

    /// The LZ4 frame decoder reported an error or stopped making progress.
    #[error("lz4 frame decompression failed: {0}")]
    DecompressionFailed(String),

    /// The input ran out before the declared original size was produced.
    #[error("input exhausted after {produced} of {expected} decompressed bytes")]
    TruncatedInput { produced: usize, expected: usize },

    /// The header names a compression algorithm this build does not support.
    #[error("unsupported compression algorithm {0}")]
    UnsupportedAlgorithm(u8),
}

pub type Result<T> = std::result::Result<T, CompressError>;
