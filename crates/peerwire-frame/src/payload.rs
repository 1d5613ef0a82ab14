//! Typed message payloads.
//!
//! A payload serializes into the bytes that follow the header and parses back
//! either from a flat buffer (after decompression) or straight off a
//! [`ZeroCopyInput`] (uncompressed messages, no intermediate copy).

use bytes::{BufMut, Bytes, BytesMut};
use peerwire_compress::{InputReader, ZeroCopyInput};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::PayloadError;

/// A payload that can travel in a protocol message.
pub trait WirePayload: Sized {
    /// Append the serialized payload to `dst`.
    fn encode(&self, dst: &mut BytesMut) -> Result<(), PayloadError>;

    /// Parse a payload from a flat buffer.
    fn decode(src: &[u8]) -> Result<Self, PayloadError>;

    /// Parse a payload from the next `len` bytes of `input`.
    ///
    /// The default gathers the bytes into one buffer and calls [`decode`](Self::decode).
    fn decode_from<S>(input: &mut S, len: usize) -> Result<Self, PayloadError>
    where
        S: ZeroCopyInput + ?Sized,
    {
        let bytes = gather(input, len)?;
        Self::decode(&bytes)
    }
}

fn gather<S>(input: &mut S, len: usize) -> Result<BytesMut, PayloadError>
where
    S: ZeroCopyInput + ?Sized,
{
    let mut out = BytesMut::with_capacity(len);
    while out.len() < len {
        let Some(chunk) = input.next_chunk() else {
            return Err(PayloadError::Truncated {
                expected: len,
                actual: out.len(),
            });
        };
        let take = chunk.len().min(len - out.len());
        out.put_slice(&chunk[..take]);
        let unused = chunk.len() - take;
        input.back_up(unused);
    }
    Ok(out)
}

/// Opaque payload bytes, passed through unparsed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawPayload(pub Bytes);

impl RawPayload {
    /// Wrap payload bytes.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// The payload bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for RawPayload {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes.into())
    }
}

impl WirePayload for RawPayload {
    fn encode(&self, dst: &mut BytesMut) -> Result<(), PayloadError> {
        dst.put_slice(&self.0);
        Ok(())
    }

    fn decode(src: &[u8]) -> Result<Self, PayloadError> {
        Ok(Self(Bytes::copy_from_slice(src)))
    }

    fn decode_from<S>(input: &mut S, len: usize) -> Result<Self, PayloadError>
    where
        S: ZeroCopyInput + ?Sized,
    {
        Ok(Self(gather(input, len)?.freeze()))
    }
}

/// A serde-serializable payload carried as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JsonPayload<T>(pub T);

impl<T> JsonPayload<T> {
    /// Consume the wrapper and return the inner value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> WirePayload for JsonPayload<T>
where
    T: Serialize + DeserializeOwned,
{
    fn encode(&self, dst: &mut BytesMut) -> Result<(), PayloadError> {
        serde_json::to_writer((&mut *dst).writer(), &self.0)?;
        Ok(())
    }

    fn decode(src: &[u8]) -> Result<Self, PayloadError> {
        Ok(Self(serde_json::from_slice(src)?))
    }

    fn decode_from<S>(input: &mut S, len: usize) -> Result<Self, PayloadError>
    where
        S: ZeroCopyInput + ?Sized,
    {
        let mut reader = InputReader::new(input, len);
        let result = serde_json::from_reader(&mut reader);
        if reader.is_exhausted() {
            return Err(PayloadError::Truncated {
                expected: len,
                actual: len - reader.remaining(),
            });
        }
        let value = result?;
        Ok(Self(value))
    }
}
