//! LZ4 frame compression with a varint original-size prefix.
//!
//! Wire format:
//! ```text
//! ┌──────────────────────┬──────────────────────────────┐
//! │ Original size        │ LZ4 frame                    │
//! │ (varint, 1..=5 B)    │ (header, blocks, end mark)   │
//! └──────────────────────┴──────────────────────────────┘
//! ```
//!
//! The prefix lets the receiver size its output buffer before decoding, and
//! decoding consumes the frame chunk by chunk straight from a
//! [`ZeroCopyInput`].

use std::io::{ErrorKind, Read, Write};

use lz4_flex::block::get_maximum_output_size;
use lz4_flex::frame::{BlockSize, FrameDecoder, FrameEncoder, FrameInfo};
use tracing::{debug, trace};

use crate::buffer::BufferFactory;
use crate::error::{CompressError, Result};
use crate::stream::{InputReader, ZeroCopyInput};
use crate::varint::{self, MAX_VARINT_LEN_U32};

/// Largest uncompressed block the encoder emits.
const MAX_BLOCK_LEN: usize = 64 * 1024;

/// Magic, descriptor flags, content size, dictionary id and header checksum.
const FRAME_HEADER_MAX_LEN: usize = 19;

/// Block size word plus optional block checksum.
const BLOCK_OVERHEAD: usize = 8;

/// End mark plus optional content checksum.
const FRAME_TRAILER_LEN: usize = 8;

/// High bit of a varint byte: more bytes follow.
const VARINT_CONTINUATION: u8 = 0x80;

/// Worst-case LZ4 frame length for `len` input bytes.
pub fn frame_bound(len: usize) -> usize {
    let full_blocks = len / MAX_BLOCK_LEN;
    let tail = len % MAX_BLOCK_LEN;

    let mut bound = FRAME_HEADER_MAX_LEN + FRAME_TRAILER_LEN;
    bound += full_blocks * (BLOCK_OVERHEAD + get_maximum_output_size(MAX_BLOCK_LEN));
    if tail > 0 {
        bound += BLOCK_OVERHEAD + get_maximum_output_size(tail);
    }
    bound
}

/// Worst-case compressed payload length (prefix plus frame) for `len` input bytes.
pub fn compress_bound(len: usize) -> usize {
    varint::encoded_len(len as u64) + frame_bound(len)
}

fn frame_info() -> FrameInfo {
    FrameInfo::new().block_size(BlockSize::Max64KB)
}

/// Compress `input` into storage obtained from `factory`.
///
/// The factory is asked once for [`compress_bound`] bytes. Returns the number
/// of bytes actually written; the caller trims its buffer to that length.
pub fn try_compress<F>(input: &[u8], factory: &mut F) -> Result<usize>
where
    F: BufferFactory + ?Sized,
{
    let original_size = u32::try_from(input.len()).map_err(|_| CompressError::InvalidSize {
        size: input.len(),
        max: u32::MAX as usize,
    })?;

    let mut prefix = [0u8; MAX_VARINT_LEN_U32];
    let prefix_len = varint::encode(u64::from(original_size), &mut prefix);
    let capacity = prefix_len + frame_bound(input.len());

    let dst = factory.allocate(capacity);
    let (head, mut body) = dst.split_at_mut(prefix_len);
    head.copy_from_slice(&prefix[..prefix_len]);

    let body_capacity = body.len();
    let mut encoder = FrameEncoder::with_frame_info(frame_info(), &mut body);
    encoder
        .write_all(input)
        .map_err(|err| CompressError::CompressionFailed(err.to_string()))?;
    encoder
        .finish()
        .map_err(|err| CompressError::CompressionFailed(err.to_string()))?;
    let frame_len = body_capacity - body.len();

    trace!(
        original = input.len(),
        compressed = prefix_len + frame_len,
        "lz4 frame compressed"
    );
    Ok(prefix_len + frame_len)
}

/// Decompress `in_size` bytes of prefixed LZ4 frame data from `input`.
///
/// The factory is asked for exactly the original size once the prefix is
/// decoded; a prefix above `max_size` is rejected before anything is
/// allocated. The frame must end with its end mark exactly at `in_size`.
/// Returns the original size.
pub fn try_decompress<S, F>(
    input: &mut S,
    in_size: usize,
    max_size: usize,
    factory: &mut F,
) -> Result<usize>
where
    S: ZeroCopyInput + ?Sized,
    F: BufferFactory + ?Sized,
{
    let (original_size, prefix_len) = read_original_size(input)?;
    if original_size > max_size {
        debug!(original_size, max_size, "lz4 original size over limit");
        return Err(CompressError::MalformedHeader);
    }
    let budget = in_size
        .checked_sub(prefix_len)
        .ok_or(CompressError::MalformedHeader)?;

    let out = factory.allocate(original_size);
    let mut decoder = FrameDecoder::new(EofTracking::new(InputReader::new(input, budget)));
    let mut produced = 0usize;

    while produced < original_size {
        match decoder.read(&mut out[produced..]) {
            Ok(0) => {
                let reader = &decoder.get_ref().inner;
                if reader.is_exhausted() || reader.remaining() == 0 {
                    return Err(CompressError::TruncatedInput {
                        produced,
                        expected: original_size,
                    });
                }
                return Err(CompressError::DecompressionFailed(
                    "decoder made no progress".to_string(),
                ));
            }
            Ok(n) => produced += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => {
                let reader = &decoder.get_ref().inner;
                return Err(read_failure(err, reader, produced, original_size));
            }
        }
    }

    finish_frame(&mut decoder, original_size)?;

    trace!(
        compressed = in_size,
        original = original_size,
        "lz4 frame decompressed"
    );
    Ok(original_size)
}

/// Read past the end mark, requiring no further output and no bytes left in
/// the budget.
fn finish_frame<S>(
    decoder: &mut FrameDecoder<EofTracking<InputReader<'_, S>>>,
    expected: usize,
) -> Result<()>
where
    S: ZeroCopyInput + ?Sized,
{
    decoder.get_mut().hit_eof = false;
    let mut scratch = [0u8; 1];
    let read = loop {
        match decoder.read(&mut scratch) {
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            other => break other,
        }
    };

    let tracker = decoder.get_ref();
    match read {
        Ok(0) if tracker.hit_eof => Err(CompressError::TruncatedInput {
            produced: expected,
            expected,
        }),
        Ok(0) if tracker.inner.remaining() != 0 => Err(CompressError::DecompressionFailed(
            "trailing bytes after lz4 frame".to_string(),
        )),
        Ok(0) => Ok(()),
        Ok(_) => Err(CompressError::DecompressionFailed(
            "frame holds more data than its declared size".to_string(),
        )),
        Err(err) => Err(read_failure(err, &tracker.inner, expected, expected)),
    }
}

fn read_failure<S>(
    err: std::io::Error,
    reader: &InputReader<'_, S>,
    produced: usize,
    expected: usize,
) -> CompressError
where
    S: ZeroCopyInput + ?Sized,
{
    let drained = reader.is_exhausted() || reader.remaining() == 0;
    if err.kind() == ErrorKind::UnexpectedEof && drained {
        return CompressError::TruncatedInput { produced, expected };
    }
    CompressError::DecompressionFailed(err.to_string())
}

/// Records whether the inner reader ever reported end of input.
///
/// The frame decoder treats end of input where a block header should be as a
/// clean stop, so a frame missing its end mark is only visible here.
struct EofTracking<R> {
    inner: R,
    hit_eof: bool,
}

impl<R> EofTracking<R> {
    fn new(inner: R) -> Self {
        Self { inner, hit_eof: false }
    }
}

impl<R: Read> Read for EofTracking<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n == 0 && !buf.is_empty() {
            self.hit_eof = true;
        }
        Ok(n)
    }
}

/// Decode the varint original-size prefix, leaving `input` positioned on the
/// first byte of the LZ4 frame. Returns the size and the prefix length.
fn read_original_size<S>(input: &mut S) -> Result<(usize, usize)>
where
    S: ZeroCopyInput + ?Sized,
{
    let mut scratch = [0u8; MAX_VARINT_LEN_U32];
    let mut filled = 0usize;

    loop {
        let chunk = input.next_chunk().ok_or(CompressError::MalformedHeader)?;

        if filled == 0 && chunk.len() >= MAX_VARINT_LEN_U32 {
            let (value, used) = varint::decode(&chunk[..MAX_VARINT_LEN_U32])
                .ok_or(CompressError::MalformedHeader)?;
            let unused = chunk.len() - used;
            input.back_up(unused);
            return Ok((checked_size(value)?, used));
        }

        let mut taken = 0usize;
        let mut terminated = false;
        for &byte in chunk {
            if filled == MAX_VARINT_LEN_U32 {
                break;
            }
            scratch[filled] = byte;
            filled += 1;
            taken += 1;
            if byte & VARINT_CONTINUATION == 0 {
                terminated = true;
                break;
            }
        }
        let unused = chunk.len() - taken;
        input.back_up(unused);

        if terminated {
            break;
        }
        if filled == MAX_VARINT_LEN_U32 {
            return Err(CompressError::MalformedHeader);
        }
    }

    let (value, used) =
        varint::decode(&scratch[..filled]).ok_or(CompressError::MalformedHeader)?;
    Ok((checked_size(value)?, used))
}

fn checked_size(value: u64) -> Result<usize> {
    u32::try_from(value)
        .map(|size| size as usize)
        .map_err(|_| CompressError::MalformedHeader)
}
