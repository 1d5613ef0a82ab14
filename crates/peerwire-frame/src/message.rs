//! Outbound message envelope.
//!
//! A [`Message`] is built once and may be queued to many peers at the same
//! time. The uncompressed wire form exists from construction; the compressed
//! form is produced by whichever sender asks for it first and then shared.

use std::sync::OnceLock;

use bytes::{BufMut, Bytes, BytesMut};
use peerwire_compress::{Algorithm, BufferFactory, HeaderReserved};
use tracing::{debug, trace};

use crate::config::CompressionPolicy;
use crate::error::Result;
use crate::header::{encode_header, HEADER_SIZE};
use crate::message_type::message_name;
use crate::payload::WirePayload;
use crate::traffic::TrafficCategory;

/// Compresses a payload into storage obtained from the factory, returning the
/// compressed length.
pub type Compressor = fn(&[u8], &mut dyn BufferFactory, Algorithm) -> Option<usize>;

fn default_compressor(
    input: &[u8],
    factory: &mut dyn BufferFactory,
    algorithm: Algorithm,
) -> Option<usize> {
    peerwire_compress::compress(input, factory, algorithm)
}

/// A serialized protocol message ready to be written to any number of peers.
#[derive(Debug)]
pub struct Message {
    buffer: Bytes,
    compressed: OnceLock<Option<Bytes>>,
    message_type: u16,
    category: TrafficCategory,
    policy: CompressionPolicy,
    compressor: Compressor,
}

impl Message {
    /// Serialize `payload` as a message of type `message_type` under the
    /// default compression policy.
    pub fn new<P: WirePayload>(payload: &P, message_type: u16) -> Result<Self> {
        Self::with_policy(payload, message_type, CompressionPolicy::default())
    }

    /// Serialize `payload` under an explicit compression policy.
    pub fn with_policy<P: WirePayload>(
        payload: &P,
        message_type: u16,
        policy: CompressionPolicy,
    ) -> Result<Self> {
        let mut buf = BytesMut::with_capacity(HEADER_SIZE + 64);
        buf.put_bytes(0, HEADER_SIZE);
        payload.encode(&mut buf)?;

        let payload_size = buf.len() - HEADER_SIZE;
        let header = encode_header(payload_size, message_type, None)?;
        buf[..HEADER_SIZE].copy_from_slice(&header);

        Ok(Self {
            buffer: buf.freeze(),
            compressed: OnceLock::new(),
            message_type,
            category: TrafficCategory::categorize(message_type),
            policy,
            compressor: default_compressor,
        })
    }

    /// Replace the function used to compress the payload.
    pub fn with_compressor(mut self, compressor: Compressor) -> Self {
        self.compressor = compressor;
        self
    }

    /// The wire bytes to send.
    ///
    /// With `want_compressed` false this is always the uncompressed form.
    /// Otherwise the first call tries to compress (concurrent callers wait for
    /// it) and every call returns the compressed form if it was kept, or the
    /// uncompressed form if the payload was ineligible or did not shrink.
    pub fn buffer(&self, want_compressed: bool) -> &Bytes {
        if !want_compressed {
            return &self.buffer;
        }
        self.compressed_buffer().unwrap_or(&self.buffer)
    }

    /// The compressed wire bytes, if this message has a compressed form.
    pub fn compressed_buffer(&self) -> Option<&Bytes> {
        self.compressed.get_or_init(|| self.compress()).as_ref()
    }

    /// The uncompressed wire bytes.
    pub fn uncompressed_buffer(&self) -> &Bytes {
        &self.buffer
    }

    /// Protocol message type code.
    pub fn message_type(&self) -> u16 {
        self.message_type
    }

    /// Traffic accounting category.
    pub fn category(&self) -> TrafficCategory {
        self.category
    }

    /// Size of the uncompressed payload.
    pub fn payload_size(&self) -> usize {
        self.buffer.len() - HEADER_SIZE
    }

    fn compress(&self) -> Option<Bytes> {
        let payload = &self.buffer[HEADER_SIZE..];
        if !self.policy.is_eligible(self.message_type, payload.len()) {
            trace!(
                message_type = message_name(self.message_type),
                size = payload.len(),
                "message not eligible for compression"
            );
            return None;
        }

        let mut out = Vec::new();
        let mut reserved = HeaderReserved::new(&mut out, HEADER_SIZE);
        let compressed_size = (self.compressor)(payload, &mut reserved, self.policy.algorithm)?;
        if compressed_size >= payload.len() {
            debug!(
                message_type = message_name(self.message_type),
                size = payload.len(),
                compressed_size,
                "compression did not shrink payload, sending uncompressed"
            );
            return None;
        }

        reserved.truncate(compressed_size);
        let algorithm = Some(self.policy.algorithm);
        let header = encode_header(compressed_size, self.message_type, algorithm).ok()?;
        reserved.prefix_mut().copy_from_slice(&header);

        trace!(
            message_type = message_name(self.message_type),
            size = payload.len(),
            compressed_size,
            "message compressed"
        );
        Some(Bytes::from(out))
    }
}
