//! The 6-byte message header.
//!
//! Wire format (big-endian, bit 47 is the most significant):
//! ```text
//! ┌────┬──────────┬──────────┬──────────────────────┬────────────────┐
//! │ 47 │ 46..44   │ 43..42   │ 41..16               │ 15..0          │
//! │ C  │ algorithm│ reserved │ payload size (26 b)  │ message type   │
//! └────┴──────────┴──────────┴──────────────────────┴────────────────┘
//! ```
//!
//! An uncompressed header has the top six bits of byte 0 clear. A compressed
//! header has bit 47 set and the algorithm id in bits 46..44.

use peerwire_compress::Algorithm;
use tracing::trace;

use crate::error::{FrameError, Result};

/// Header size in bytes.
pub const HEADER_SIZE: usize = 6;

/// Largest payload the 26-bit size field can describe.
pub const MAX_PAYLOAD_SIZE: usize = 0x03FF_FFFF;

/// Default largest payload accepted from a peer: 64 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 64 * 1024 * 1024;

const COMPRESSED_FLAG: u8 = 0x80;
const ALGORITHM_MASK: u8 = 0x70;
const ALGORITHM_SHIFT: u32 = 4;
const FLAGS_MASK: u8 = 0xFC;
const PAYLOAD_SIZE_MASK: u32 = 0x03FF_FFFF;

/// Parsed view of a message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    /// Header plus payload, as the message occupies the wire.
    pub total_wire_size: u32,
    /// Size of the header itself.
    pub header_size: u32,
    /// Size of the payload as declared on the wire.
    pub payload_wire_size: u32,
    /// Protocol message type code.
    pub message_type: u16,
    /// Whether the payload is compressed.
    pub compressed: bool,
    /// Compression algorithm id (meaningful only when `compressed`).
    pub algorithm: u8,
}

impl MessageHeader {
    /// True once `available` bytes cover the whole message.
    pub fn is_complete(&self, available: usize) -> bool {
        self.total_wire_size as usize <= available
    }

    /// The compression algorithm, if the payload is compressed with a known one.
    pub fn compression(&self) -> Option<Algorithm> {
        if !self.compressed {
            return None;
        }
        Algorithm::try_from(self.algorithm).ok()
    }
}

/// Encode a header for a payload of `payload_size` bytes.
///
/// `compression` is `None` for an uncompressed payload.
pub fn encode_header(
    payload_size: usize,
    message_type: u16,
    compression: Option<Algorithm>,
) -> Result<[u8; HEADER_SIZE]> {
    if payload_size > MAX_PAYLOAD_SIZE {
        return Err(FrameError::PayloadTooLarge {
            size: payload_size,
            max: MAX_PAYLOAD_SIZE,
        });
    }

    let flags = match compression {
        Some(algorithm) => COMPRESSED_FLAG | (algorithm.id() << ALGORITHM_SHIFT),
        None => 0,
    };
    let size = payload_size as u32;
    let [type_hi, type_lo] = message_type.to_be_bytes();

    Ok([
        flags | (size >> 24) as u8,
        (size >> 16) as u8,
        (size >> 8) as u8,
        size as u8,
        type_hi,
        type_lo,
    ])
}

/// Total bytes held by a buffer sequence.
pub fn buffer_len<B: AsRef<[u8]>>(buffers: &[B]) -> usize {
    buffers.iter().map(|buf| buf.as_ref().len()).sum()
}

/// Read a header from the front of `buffers`, which hold `available` bytes.
///
/// Returns `Ok(None)` when fewer than [`HEADER_SIZE`] bytes are available, and
/// [`FrameError::MalformedHeader`] when the leading byte matches no layout.
/// The payload need not be complete; see [`MessageHeader::is_complete`].
pub fn peek_header<B: AsRef<[u8]>>(
    buffers: &[B],
    available: usize,
) -> Result<Option<MessageHeader>> {
    let mut bytes = buffers
        .iter()
        .flat_map(|buf| buf.as_ref().iter().copied())
        .take(available);

    let Some(first) = bytes.next() else {
        return Ok(None);
    };

    let compressed = first & COMPRESSED_FLAG != 0;
    if first & FLAGS_MASK != 0 && !compressed {
        return Err(FrameError::MalformedHeader(first));
    }

    if available < HEADER_SIZE {
        return Ok(None);
    }

    let mut payload_wire_size = u32::from(first);
    for _ in 1..4 {
        let Some(byte) = bytes.next() else {
            return Ok(None);
        };
        payload_wire_size = (payload_wire_size << 8) | u32::from(byte);
    }
    payload_wire_size &= PAYLOAD_SIZE_MASK;

    let mut message_type = 0u16;
    for _ in 0..2 {
        let Some(byte) = bytes.next() else {
            return Ok(None);
        };
        message_type = (message_type << 8) | u16::from(byte);
    }

    let header_size = HEADER_SIZE as u32;
    Ok(Some(MessageHeader {
        total_wire_size: header_size + payload_wire_size,
        header_size,
        payload_wire_size,
        message_type,
        compressed,
        algorithm: (first & ALGORITHM_MASK) >> ALGORITHM_SHIFT,
    }))
}

/// Parse a complete message header from `buffers`, which hold `available` bytes.
///
/// Returns `None` until the whole message (header and payload) is buffered,
/// and also for a malformed leading byte. Use [`peek_header`] to tell those
/// apart.
pub fn parse_header<B: AsRef<[u8]>>(buffers: &[B], available: usize) -> Option<MessageHeader> {
    match peek_header(buffers, available) {
        Ok(Some(header)) if header.is_complete(available) => Some(header),
        Ok(_) => None,
        Err(err) => {
            trace!(error = %err, "unparseable message header");
            None
        }
    }
}
