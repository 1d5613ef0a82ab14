//! Callbacks invoked for each dispatched message.

use std::any::Any;
use std::sync::Arc;

/// A decoded inbound message, shared so handlers can keep it past dispatch.
#[derive(Clone)]
pub struct InboundMessage {
    message_type: u16,
    payload: Arc<dyn Any + Send + Sync>,
}

impl InboundMessage {
    /// Wrap a decoded payload.
    pub fn new<T: Any + Send + Sync>(message_type: u16, payload: T) -> Self {
        Self {
            message_type,
            payload: Arc::new(payload),
        }
    }

    /// Protocol message type code.
    pub fn message_type(&self) -> u16 {
        self.message_type
    }

    /// Borrow the payload as `T`, if that is its type.
    pub fn payload<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref()
    }

    /// Take shared ownership of the payload as `T`.
    pub fn downcast<T: Any + Send + Sync>(self) -> Result<Arc<T>, Self> {
        let message_type = self.message_type;
        self.payload
            .downcast()
            .map_err(|payload| Self { message_type, payload })
    }
}

impl std::fmt::Debug for InboundMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InboundMessage")
            .field("message_type", &self.message_type)
            .finish_non_exhaustive()
    }
}

/// Receives the messages a dispatcher decodes.
///
/// For each decoded message the dispatcher calls `on_message_begin`,
/// `on_message`, then `on_message_end`, in that order.
pub trait MessageHandler {
    /// Called before the message is delivered. `wire_size` is the payload
    /// size as it appeared on the wire.
    fn on_message_begin(
        &mut self,
        _message_type: u16,
        _message: &InboundMessage,
        _wire_size: usize,
    ) {
    }

    /// Deliver the message.
    fn on_message(&mut self, message: &InboundMessage);

    /// Called after the message is delivered.
    fn on_message_end(&mut self, _message_type: u16, _message: &InboundMessage) {}

    /// Called instead of the above when no decoder is registered for the type.
    fn on_unknown_message(&mut self, _message_type: u16) {}
}
