//! Payload compression for the peer wire protocol.
//!
//! This is the lowest layer of peerwire. Compressed payloads are an LZ4 frame
//! prefixed with the original size as a base-127 varint:
//! - Output storage comes from a caller-supplied [`BufferFactory`]
//! - Input is read chunk by chunk through [`ZeroCopyInput`]
//!
//! The top-level [`compress`] and [`decompress`] never surface error detail:
//! failure is reported as `None` and logged at debug level.

pub mod buffer;
pub mod error;
pub mod lz4f;
pub mod stream;
pub mod varint;

use tracing::debug;

pub use buffer::{BufferFactory, HeaderReserved};
pub use error::{CompressError, Result};
pub use lz4f::{compress_bound, frame_bound};
pub use stream::{ChunkedInput, InputReader, ZeroCopyInput};

/// Compression algorithms that can appear in a message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Algorithm {
    /// LZ4 frame format with a varint size prefix.
    Lz4 = 1,
}

impl Algorithm {
    /// The 3-bit identifier carried in the message header.
    pub const fn id(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Algorithm {
    type Error = CompressError;

    fn try_from(id: u8) -> Result<Self> {
        match id {
            1 => Ok(Self::Lz4),
            other => Err(CompressError::UnsupportedAlgorithm(other)),
        }
    }
}

/// Compress `input` into storage obtained from `factory`.
///
/// Returns the number of bytes written, or `None` if compression failed.
pub fn compress<F>(input: &[u8], factory: &mut F, algorithm: Algorithm) -> Option<usize>
where
    F: BufferFactory + ?Sized,
{
    let result = match algorithm {
        Algorithm::Lz4 => lz4f::try_compress(input, factory),
    };

    match result {
        Ok(written) => Some(written),
        Err(err) => {
            debug!(error = %err, len = input.len(), "payload compression failed");
            None
        }
    }
}

/// Decompress `in_size` bytes from `input` into storage obtained from `factory`.
///
/// `algorithm` is the raw identifier from the message header. A declared
/// original size above `max_size` is refused before any storage is requested.
/// Returns the decompressed size, or `None` if the data could not be
/// decompressed.
pub fn decompress<S, F>(
    input: &mut S,
    in_size: usize,
    max_size: usize,
    factory: &mut F,
    algorithm: u8,
) -> Option<usize>
where
    S: ZeroCopyInput + ?Sized,
    F: BufferFactory + ?Sized,
{
    let result = Algorithm::try_from(algorithm).and_then(|algorithm| match algorithm {
        Algorithm::Lz4 => lz4f::try_decompress(input, in_size, max_size, factory),
    });

    match result {
        Ok(size) => Some(size),
        Err(err) => {
            debug!(error = %err, in_size, max_size, algorithm, "payload decompression failed");
            None
        }
    }
}
