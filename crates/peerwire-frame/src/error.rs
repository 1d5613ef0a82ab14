/// Errors that can occur while building or framing messages.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The leading header byte matches no known layout.
    #[error("malformed message header (leading byte {0:#04x})")]
    MalformedHeader(u8),

    /// The payload exceeds what the header or configuration allows.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The payload could not be serialized.
    #[error("payload error: {0}")]
    Payload(#[from] PayloadError),

    /// An I/O error surfaced through a stream codec.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while encoding or decoding a typed payload.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// The payload is not valid JSON for the expected type.
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Fewer payload bytes were available than the header declared.
    #[error("payload truncated ({actual} of {expected} bytes)")]
    Truncated { expected: usize, actual: usize },

    /// The payload bytes are structurally invalid.
    #[error("invalid payload: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, FrameError>;
