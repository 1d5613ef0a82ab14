//! Peer-to-peer ledger wire framing with LZ4 payload compression.
//!
//! # Crate Structure
//!
//! - [`compress`]: base-127 varints, LZ4 frame compression, zero-copy chunked input
//! - [`frame`]: the 6-byte message header and the shared outbound [`Message`](frame::Message)
//! - [`protocol`]: inbound dispatch to typed handlers (behind `protocol` feature)
//!
//! The streaming `tokio_util` codec lives in [`frame`] behind the `async` feature.

/// Re-export compression types.
pub mod compress {
    pub use peerwire_compress::*;
}

/// Re-export frame types.
pub mod frame {
    pub use peerwire_frame::*;
}

/// Re-export dispatch types (requires `protocol` feature).
#[cfg(feature = "protocol")]
pub mod protocol {
    pub use peerwire_protocol::*;
}
