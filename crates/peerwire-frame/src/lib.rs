//! Message headers and outbound envelopes for the peer wire protocol.
//!
//! Every message on a peer connection starts with a 6-byte header:
//! - A compression flag and 3-bit algorithm id
//! - A 26-bit big-endian payload size
//! - A 16-bit big-endian message type
//!
//! Outbound messages are serialized once into a shared [`Message`] that can
//! hand out either its plain or its compressed wire form.

pub mod config;
pub mod error;
pub mod header;
pub mod message;
pub mod message_type;
pub mod payload;
pub mod traffic;

#[cfg(feature = "async")]
pub mod codec;

#[cfg(feature = "async")]
pub use codec::{CodecConfig, PeerCodec, WireFrame};
pub use config::{CompressionPolicy, DEFAULT_MIN_COMPRESS_SIZE};
pub use error::{FrameError, PayloadError, Result};
pub use header::{
    buffer_len, encode_header, parse_header, peek_header, MessageHeader, DEFAULT_MAX_PAYLOAD,
    HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
pub use message::{Compressor, Message};
pub use message_type::{is_compressible, is_known, message_name};
pub use payload::{JsonPayload, RawPayload, WirePayload};
pub use traffic::TrafficCategory;
