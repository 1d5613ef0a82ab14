use std::io;

/// Errors that end dispatch of a peer's byte stream.
///
/// Every variant is fatal for the connection it came from.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// The header declares a payload larger than the configured limit.
    #[error("message too large ({size} bytes, max {max})")]
    MessageTooLarge { size: usize, max: usize },

    /// The leading header byte matches no known layout.
    #[error("malformed message header (leading byte {0:#04x})")]
    MalformedHeader(u8),

    /// A complete message could not be decompressed or parsed.
    #[error("bad message of type {message_type}: {reason}")]
    BadMessage { message_type: u16, reason: String },
}

impl From<DispatchError> for io::Error {
    fn from(err: DispatchError) -> Self {
        io::Error::new(io::ErrorKind::InvalidData, err)
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;
