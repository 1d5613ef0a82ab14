//! Inbound message dispatch for the peer wire protocol.
//!
//! A [`Dispatcher`] looks at the bytes received from a peer, waits until a
//! whole message is buffered, decodes its payload with the decoder registered
//! for its type, and hands the result to a [`MessageHandler`]. It does no I/O:
//! the transport feeds it buffers and drops the bytes it reports consumed.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod registry;

pub use config::DispatchConfig;
pub use dispatch::{Dispatched, Dispatcher};
pub use error::{DispatchError, Result};
pub use handler::{InboundMessage, MessageHandler};
pub use registry::{DecoderRegistry, PayloadDecoder, TypedDecoder};
