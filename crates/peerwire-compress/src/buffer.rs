//! Caller-owned output storage for compression and decompression.

use bytes::BytesMut;

/// Hands out a writable region of exactly the requested length.
///
/// Compression asks for its worst-case bound and reports how much it actually
/// wrote; decompression asks for the exact original size. Implementations
/// decide where the bytes live, so output can land directly in a send or
/// receive buffer without an intermediate copy.
pub trait BufferFactory {
    /// Return a writable region of exactly `len` bytes.
    fn allocate(&mut self, len: usize) -> &mut [u8];
}

impl BufferFactory for Vec<u8> {
    fn allocate(&mut self, len: usize) -> &mut [u8] {
        self.clear();
        self.resize(len, 0);
        self.as_mut_slice()
    }
}

impl BufferFactory for BytesMut {
    fn allocate(&mut self, len: usize) -> &mut [u8] {
        self.clear();
        self.resize(len, 0);
        &mut self[..]
    }
}

/// Allocates behind a fixed-size prefix of an existing vector.
///
/// Used to compress a payload straight into a message buffer while leaving
/// room for the message header in front of it.
#[derive(Debug)]
pub struct HeaderReserved<'a> {
    buf: &'a mut Vec<u8>,
    prefix: usize,
}

impl<'a> HeaderReserved<'a> {
    /// Reserve `prefix` bytes at the front of `buf` for later use.
    pub fn new(buf: &'a mut Vec<u8>, prefix: usize) -> Self {
        Self { buf, prefix }
    }

    /// Shrink the allocated region to `len` bytes after the prefix.
    pub fn truncate(&mut self, len: usize) {
        self.buf.truncate(self.prefix + len);
    }

    /// The reserved prefix, for writing once the region size is known.
    pub fn prefix_mut(&mut self) -> &mut [u8] {
        &mut self.buf[..self.prefix]
    }
}

impl BufferFactory for HeaderReserved<'_> {
    fn allocate(&mut self, len: usize) -> &mut [u8] {
        self.buf.clear();
        self.buf.resize(self.prefix + len, 0);
        &mut self.buf[self.prefix..]
    }
}
