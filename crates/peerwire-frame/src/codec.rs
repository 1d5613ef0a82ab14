//! Streaming codec for `tokio_util::codec::Framed`.

use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

use crate::error::{FrameError, Result};
use crate::header::{peek_header, MessageHeader, DEFAULT_MAX_PAYLOAD};
use crate::message::Message;

/// One complete message as it arrived on the wire.
#[derive(Debug, Clone)]
pub struct WireFrame {
    /// Parsed header.
    pub header: MessageHeader,
    /// Header and payload bytes.
    pub frame: Bytes,
}

impl WireFrame {
    /// The payload bytes, still compressed if the header says so.
    pub fn payload(&self) -> Bytes {
        self.frame.slice(self.header.header_size as usize..)
    }
}

/// Configuration for [`PeerCodec`].
#[derive(Debug, Clone)]
pub struct CodecConfig {
    /// Maximum payload size in bytes. Default: 64 MiB.
    pub max_payload_size: usize,
    /// Whether the peer accepts compressed messages.
    pub compression_enabled: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
            compression_enabled: false,
        }
    }
}

/// Splits whole messages off a byte stream and writes shared outbound
/// messages.
#[derive(Debug, Clone, Default)]
pub struct PeerCodec {
    config: CodecConfig,
}

impl PeerCodec {
    /// Create a codec with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a codec with explicit configuration.
    pub fn with_config(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Current configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Turn compressed sends on or off, e.g. after the handshake settles it.
    pub fn set_compression(&mut self, enabled: bool) {
        self.config.compression_enabled = enabled;
    }
}

impl Decoder for PeerCodec {
    type Item = WireFrame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<WireFrame>> {
        let Some(header) = peek_header(&[&src[..]], src.len())? else {
            return Ok(None);
        };

        let payload_size = header.payload_wire_size as usize;
        if payload_size > self.config.max_payload_size {
            warn!(
                size = payload_size,
                max = self.config.max_payload_size,
                "peer sent oversized message"
            );
            return Err(FrameError::PayloadTooLarge {
                size: payload_size,
                max: self.config.max_payload_size,
            });
        }

        let total = header.total_wire_size as usize;
        if src.len() < total {
            src.reserve(total - src.len());
            return Ok(None);
        }

        let frame = src.split_to(total).freeze();
        Ok(Some(WireFrame { header, frame }))
    }
}

impl Encoder<Arc<Message>> for PeerCodec {
    type Error = FrameError;

    fn encode(&mut self, message: Arc<Message>, dst: &mut BytesMut) -> Result<()> {
        dst.extend_from_slice(message.buffer(self.config.compression_enabled));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{encode_header, HEADER_SIZE};
    use crate::message_type::{LEDGER_DATA, PING};
    use crate::payload::RawPayload;

    fn raw_frame(payload: &[u8], message_type: u16) -> Vec<u8> {
        let mut wire = encode_header(payload.len(), message_type, None).unwrap().to_vec();
        wire.extend_from_slice(payload);
        wire
    }

    #[test]
    fn decodes_back_to_back_frames() {
        let mut codec = PeerCodec::new();
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&raw_frame(b"one", PING));
        buf.extend_from_slice(&raw_frame(b"second", LEDGER_DATA));

        let first = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(first.header.message_type, PING);
        assert_eq!(&first.payload()[..], b"one");

        let second = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(second.header.message_type, LEDGER_DATA);
        assert_eq!(&second.payload()[..], b"second");

        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert!(buf.is_empty());
    }

    #[test]
    fn waits_for_partial_frame() {
        let mut codec = PeerCodec::new();
        let wire = raw_frame(&[9u8; 100], LEDGER_DATA);
        let mut buf = BytesMut::new();

        for byte in &wire[..wire.len() - 1] {
            buf.extend_from_slice(&[*byte]);
            assert!(codec.decode(&mut buf).unwrap().is_none());
        }
        buf.extend_from_slice(&wire[wire.len() - 1..]);
        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(frame.frame.len(), HEADER_SIZE + 100);
    }

    #[test]
    fn rejects_oversized_from_header_alone() {
        let mut codec = PeerCodec::with_config(CodecConfig {
            max_payload_size: 1024,
            ..CodecConfig::default()
        });
        let header = encode_header(1025, LEDGER_DATA, None).unwrap();
        let mut buf = BytesMut::from(&header[..]);

        let err = codec.decode(&mut buf).unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { size: 1025, max: 1024 }));
    }

    #[test]
    fn rejects_malformed_header() {
        let mut codec = PeerCodec::new();
        let mut buf = BytesMut::from(&[0x40u8, 0, 0, 0, 0, 1][..]);
        assert!(matches!(codec.decode(&mut buf), Err(FrameError::MalformedHeader(0x40))));
    }

    #[test]
    fn encoder_honours_compression_setting() {
        let payload = RawPayload::from(b"abcdefgh".repeat(512));
        let message = Arc::new(Message::new(&payload, LEDGER_DATA).unwrap());
        let mut codec = PeerCodec::new();

        let mut plain = BytesMut::new();
        codec.encode(Arc::clone(&message), &mut plain).unwrap();
        assert_eq!(plain.len(), HEADER_SIZE + 4096);

        codec.set_compression(true);
        let mut compressed = BytesMut::new();
        codec.encode(message, &mut compressed).unwrap();
        assert!(compressed.len() < plain.len());
        assert_eq!(compressed[0] & 0x80, 0x80);

        let frame = codec.decode(&mut compressed).unwrap().unwrap();
        assert!(frame.header.compressed);
    }
}
