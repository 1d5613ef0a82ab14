use std::collections::HashMap;
use std::marker::PhantomData;

use peerwire_compress::ZeroCopyInput;
use peerwire_frame::message_type::KNOWN;
use peerwire_frame::{PayloadError, RawPayload, WirePayload};

use crate::handler::InboundMessage;

/// Parses the payload of one message type.
pub trait PayloadDecoder: Send + Sync {
    /// Parse a payload held in one flat buffer.
    fn decode(&self, message_type: u16, src: &[u8]) -> Result<InboundMessage, PayloadError>;

    /// Parse a payload from the next `len` bytes of `input`.
    fn decode_stream(
        &self,
        message_type: u16,
        input: &mut dyn ZeroCopyInput,
        len: usize,
    ) -> Result<InboundMessage, PayloadError>;
}

/// Decoder for any [`WirePayload`] type.
pub struct TypedDecoder<P> {
    _payload: PhantomData<fn() -> P>,
}

impl<P> TypedDecoder<P> {
    /// A decoder that parses payloads as `P`.
    pub fn new() -> Self {
        Self { _payload: PhantomData }
    }
}

impl<P> Default for TypedDecoder<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> PayloadDecoder for TypedDecoder<P>
where
    P: WirePayload + Send + Sync + 'static,
{
    fn decode(&self, message_type: u16, src: &[u8]) -> Result<InboundMessage, PayloadError> {
        Ok(InboundMessage::new(message_type, P::decode(src)?))
    }

    fn decode_stream(
        &self,
        message_type: u16,
        input: &mut dyn ZeroCopyInput,
        len: usize,
    ) -> Result<InboundMessage, PayloadError> {
        Ok(InboundMessage::new(message_type, P::decode_from(input, len)?))
    }
}

/// Type-code-keyed registry of payload decoders.
#[derive(Default)]
pub struct DecoderRegistry {
    decoders: HashMap<u16, Box<dyn PayloadDecoder>>,
}

impl DecoderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry that passes every known message type through as a
    /// [`RawPayload`].
    pub fn with_raw_payloads() -> Self {
        let mut registry = Self::new();
        for message_type in KNOWN {
            registry.register::<RawPayload>(message_type);
        }
        registry
    }

    /// Decode messages of `message_type` as `P`, replacing any earlier decoder.
    pub fn register<P>(&mut self, message_type: u16)
    where
        P: WirePayload + Send + Sync + 'static,
    {
        self.register_decoder(message_type, TypedDecoder::<P>::new());
    }

    /// Register a custom decoder for `message_type`.
    pub fn register_decoder(&mut self, message_type: u16, decoder: impl PayloadDecoder + 'static) {
        self.decoders.insert(message_type, Box::new(decoder));
    }

    /// Remove the decoder for `message_type`.
    pub fn unregister(&mut self, message_type: u16) -> bool {
        self.decoders.remove(&message_type).is_some()
    }

    /// The decoder for `message_type`, if one is registered.
    pub fn get(&self, message_type: u16) -> Option<&dyn PayloadDecoder> {
        self.decoders.get(&message_type).map(|decoder| decoder.as_ref())
    }

    /// Check whether `message_type` has a decoder.
    pub fn contains(&self, message_type: u16) -> bool {
        self.decoders.contains_key(&message_type)
    }

    /// Registered type codes, sorted.
    pub fn message_types(&self) -> Vec<u16> {
        let mut types: Vec<u16> = self.decoders.keys().copied().collect();
        types.sort_unstable();
        types
    }
}

impl std::fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderRegistry")
            .field("message_types", &self.message_types())
            .finish()
    }
}
