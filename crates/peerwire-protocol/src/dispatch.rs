//! Splitting a peer's receive buffer into messages and handing them out.

use bytes::{Buf, BytesMut};
use peerwire_compress::{ChunkedInput, ZeroCopyInput};
use peerwire_frame::{buffer_len, message_name, peek_header, MessageHeader, PayloadError};
use tracing::{debug, trace, warn};

use crate::config::DispatchConfig;
use crate::error::{DispatchError, Result};
use crate::handler::{InboundMessage, MessageHandler};
use crate::registry::{DecoderRegistry, PayloadDecoder};

/// Outcome of one [`Dispatcher::dispatch_one`] call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dispatched {
    /// Bytes the caller should drop from the front of its buffers.
    pub consumed: usize,
    /// Set when the connection must be dropped.
    pub error: Option<DispatchError>,
}

impl Dispatched {
    fn pending() -> Self {
        Self::default()
    }

    fn done(consumed: usize) -> Self {
        Self { consumed, error: None }
    }

    fn failed(consumed: usize, error: DispatchError) -> Self {
        Self {
            consumed,
            error: Some(error),
        }
    }

    /// True if more bytes are needed before anything can be dispatched.
    pub fn is_pending(&self) -> bool {
        self.consumed == 0 && self.error.is_none()
    }
}

/// Decodes messages with a [`DecoderRegistry`] and passes them to a handler.
#[derive(Debug, Default)]
pub struct Dispatcher {
    registry: DecoderRegistry,
    config: DispatchConfig,
}

impl Dispatcher {
    /// Create a dispatcher with default configuration.
    pub fn new(registry: DecoderRegistry) -> Self {
        Self::with_config(registry, DispatchConfig::default())
    }

    /// Create a dispatcher with explicit configuration.
    pub fn with_config(registry: DecoderRegistry, config: DispatchConfig) -> Self {
        Self { registry, config }
    }

    /// The decoder registry.
    pub fn registry(&self) -> &DecoderRegistry {
        &self.registry
    }

    /// Mutable access to the decoder registry.
    pub fn registry_mut(&mut self) -> &mut DecoderRegistry {
        &mut self.registry
    }

    /// Current configuration.
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Dispatch at most one message from the front of `buffers`.
    ///
    /// Returns zero bytes consumed and no error while the message is still
    /// incomplete. Once a whole message is buffered it is consumed even if it
    /// fails to decode.
    pub fn dispatch_one<B, H>(&self, buffers: &[B], handler: &mut H) -> Dispatched
    where
        B: AsRef<[u8]>,
        H: MessageHandler + ?Sized,
    {
        let available = buffer_len(buffers);
        if available == 0 {
            return Dispatched::pending();
        }

        let header = match peek_header(buffers, available) {
            Ok(Some(header)) => header,
            Ok(None) => return Dispatched::pending(),
            Err(err) => {
                warn!(error = %err, "dropping peer after malformed header");
                return Dispatched::failed(0, DispatchError::MalformedHeader(leading_byte(buffers)));
            }
        };

        let payload_size = header.payload_wire_size as usize;
        if payload_size > self.config.max_payload_size {
            warn!(
                message_type = header.message_type,
                size = payload_size,
                max = self.config.max_payload_size,
                "dropping peer after oversized message"
            );
            return Dispatched::failed(
                0,
                DispatchError::MessageTooLarge {
                    size: payload_size,
                    max: self.config.max_payload_size,
                },
            );
        }

        if !header.is_complete(available) {
            trace!(
                need = header.total_wire_size,
                available,
                "waiting for rest of message"
            );
            return Dispatched::pending();
        }

        let total = header.total_wire_size as usize;
        let Some(decoder) = self.registry.get(header.message_type) else {
            debug!(message_type = header.message_type, size = payload_size, "unknown message type");
            handler.on_unknown_message(header.message_type);
            return Dispatched::done(total);
        };

        match decode(decoder, buffers, &header, self.config.max_payload_size) {
            Ok(message) => {
                handler.on_message_begin(header.message_type, &message, payload_size);
                handler.on_message(&message);
                handler.on_message_end(header.message_type, &message);
                Dispatched::done(total)
            }
            Err(err) => {
                warn!(
                    message_type = message_name(header.message_type),
                    compressed = header.compressed,
                    error = %err,
                    "failed to decode message"
                );
                Dispatched::failed(
                    total,
                    DispatchError::BadMessage {
                        message_type: header.message_type,
                        reason: err.to_string(),
                    },
                )
            }
        }
    }

    /// Dispatch every complete message in `buf`, advancing it past each one.
    ///
    /// Returns the number of messages dispatched, or the first fatal error.
    /// A message that failed to decode is still removed from `buf`.
    pub fn dispatch_all<H>(&self, buf: &mut BytesMut, handler: &mut H) -> Result<usize>
    where
        H: MessageHandler + ?Sized,
    {
        let mut dispatched = 0;
        loop {
            let outcome = self.dispatch_one(&[&buf[..]], handler);
            buf.advance(outcome.consumed);
            if let Some(err) = outcome.error {
                return Err(err);
            }
            if outcome.consumed == 0 {
                return Ok(dispatched);
            }
            dispatched += 1;
        }
    }
}

fn decode<B: AsRef<[u8]>>(
    decoder: &dyn PayloadDecoder,
    buffers: &[B],
    header: &MessageHeader,
    max_size: usize,
) -> std::result::Result<InboundMessage, PayloadError> {
    let payload_size = header.payload_wire_size as usize;
    let mut input = ChunkedInput::bounded(buffers, header.total_wire_size as usize);
    if !input.skip(header.header_size as usize) {
        return Err(PayloadError::Truncated {
            expected: header.total_wire_size as usize,
            actual: input.position(),
        });
    }

    if !header.compressed {
        return decoder.decode_stream(header.message_type, &mut input, payload_size);
    }

    let mut flat = Vec::new();
    let decompressed = peerwire_compress::decompress(
        &mut input,
        payload_size,
        max_size,
        &mut flat,
        header.algorithm,
    );
    let Some(size) = decompressed else {
        return Err(PayloadError::Invalid(format!(
            "cannot decompress {payload_size}-byte payload (algorithm {})",
            header.algorithm
        )));
    };
    decoder.decode(header.message_type, &flat[..size])
}

fn leading_byte<B: AsRef<[u8]>>(buffers: &[B]) -> u8 {
    buffers
        .iter()
        .find_map(|buf| buf.as_ref().first().copied())
        .unwrap_or_default()
}
