//! Zero-copy input over discontiguous byte chunks.
//!
//! Network receive buffers arrive as a sequence of chunks. [`ZeroCopyInput`]
//! walks them in place: a consumer pulls whole chunks, gives back whatever it
//! did not use, and can skip ahead without materializing bytes.

use std::io::{self, Read};

/// A forward-only source of borrowed byte chunks.
pub trait ZeroCopyInput {
    /// Return the next non-empty chunk, or `None` once the input is exhausted.
    fn next_chunk(&mut self) -> Option<&[u8]>;

    /// Give back the last `count` bytes of the chunk most recently returned by
    /// [`next_chunk`](Self::next_chunk). They are returned again by the next call.
    fn back_up(&mut self, count: usize);

    /// Advance `count` bytes. Returns `false` if the input ended first.
    fn skip(&mut self, count: usize) -> bool;

    /// Total bytes consumed so far.
    fn position(&self) -> usize;
}

/// [`ZeroCopyInput`] over a slice of chunks, optionally capped at a byte limit.
#[derive(Debug, Clone)]
pub struct ChunkedInput<'a, B> {
    chunks: &'a [B],
    index: usize,
    offset: usize,
    limit: usize,
    position: usize,
    last_len: usize,
}

impl<'a, B: AsRef<[u8]>> ChunkedInput<'a, B> {
    /// Walk every byte of `chunks`.
    pub fn new(chunks: &'a [B]) -> Self {
        Self::bounded(chunks, usize::MAX)
    }

    /// Walk at most `limit` bytes of `chunks`.
    pub fn bounded(chunks: &'a [B], limit: usize) -> Self {
        Self {
            chunks,
            index: 0,
            offset: 0,
            limit,
            position: 0,
            last_len: 0,
        }
    }

    /// Bytes still readable before the chunks or the limit run out.
    pub fn remaining(&self) -> usize {
        let buffered: usize = self
            .chunks
            .iter()
            .skip(self.index)
            .map(|chunk| chunk.as_ref().len())
            .sum::<usize>()
            .saturating_sub(self.offset);
        buffered.min(self.limit - self.position)
    }
}

impl<B: AsRef<[u8]>> ZeroCopyInput for ChunkedInput<'_, B> {
    fn next_chunk(&mut self) -> Option<&[u8]> {
        let chunks = self.chunks;
        while let Some(chunk) = chunks.get(self.index) {
            let chunk = chunk.as_ref();
            if self.offset >= chunk.len() {
                self.index += 1;
                self.offset = 0;
                continue;
            }

            let budget = self.limit - self.position;
            if budget == 0 {
                break;
            }

            let end = chunk.len().min(self.offset.saturating_add(budget));
            let out = &chunk[self.offset..end];
            self.offset = end;
            self.position += out.len();
            self.last_len = out.len();
            return Some(out);
        }

        self.last_len = 0;
        None
    }

    fn back_up(&mut self, count: usize) {
        debug_assert!(
            count <= self.last_len,
            "back_up({count}) exceeds last chunk ({})",
            self.last_len
        );
        let count = count.min(self.last_len);
        self.offset -= count;
        self.position -= count;
        self.last_len -= count;
    }

    fn skip(&mut self, mut count: usize) -> bool {
        self.last_len = 0;
        let chunks = self.chunks;
        while count > 0 {
            let Some(chunk) = chunks.get(self.index) else {
                return false;
            };
            let budget = self.limit - self.position;
            if budget == 0 {
                return false;
            }

            let available = (chunk.as_ref().len() - self.offset).min(budget);
            if available == 0 {
                self.index += 1;
                self.offset = 0;
                continue;
            }

            let step = available.min(count);
            self.offset += step;
            self.position += step;
            count -= step;
        }
        true
    }

    fn position(&self) -> usize {
        self.position
    }
}

/// Bounded [`Read`] adapter over a [`ZeroCopyInput`].
///
/// Serves at most `limit` bytes. Whatever part of a chunk a read does not
/// need is backed up into the input, so nothing past the caller's consumption
/// is lost.
pub struct InputReader<'a, S: ?Sized> {
    input: &'a mut S,
    remaining: usize,
    exhausted: bool,
}

impl<'a, S: ZeroCopyInput + ?Sized> InputReader<'a, S> {
    /// Read at most `limit` bytes from `input`.
    pub fn new(input: &'a mut S, limit: usize) -> Self {
        Self {
            input,
            remaining: limit,
            exhausted: false,
        }
    }

    /// Bytes left in the budget.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// True once the underlying input ran dry before the budget was spent.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

impl<S: ZeroCopyInput + ?Sized> Read for InputReader<'_, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() || self.remaining == 0 {
            return Ok(0);
        }

        let Some(chunk) = self.input.next_chunk() else {
            self.exhausted = true;
            return Ok(0);
        };

        let n = chunk.len().min(buf.len()).min(self.remaining);
        buf[..n].copy_from_slice(&chunk[..n]);
        let unused = chunk.len() - n;
        self.input.back_up(unused);
        self.remaining -= n;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain<S: ZeroCopyInput>(input: &mut S) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(chunk) = input.next_chunk() {
            out.extend_from_slice(chunk);
        }
        out
    }

    #[test]
    fn yields_chunks_in_order_and_skips_empty() {
        let chunks: Vec<&[u8]> = vec![&b"ab"[..], &b""[..], &b"cde"[..], &b"f"[..]];
        let mut input = ChunkedInput::new(&chunks);

        assert_eq!(input.next_chunk(), Some(&b"ab"[..]));
        assert_eq!(input.next_chunk(), Some(&b"cde"[..]));
        assert_eq!(input.next_chunk(), Some(&b"f"[..]));
        assert_eq!(input.next_chunk(), None);
        assert_eq!(input.position(), 6);
    }

    #[test]
    fn back_up_returns_tail_of_last_chunk() {
        let chunks: Vec<&[u8]> = vec![&b"hello"[..], &b"world"[..]];
        let mut input = ChunkedInput::new(&chunks);

        assert_eq!(input.next_chunk(), Some(&b"hello"[..]));
        input.back_up(2);
        assert_eq!(input.position(), 3);
        assert_eq!(input.next_chunk(), Some(&b"lo"[..]));
        assert_eq!(input.next_chunk(), Some(&b"world"[..]));
    }

    #[test]
    fn skip_crosses_chunk_boundaries() {
        let chunks: Vec<&[u8]> = vec![&b"abc"[..], &b"de"[..], &b"fghij"[..]];
        let mut input = ChunkedInput::new(&chunks);

        assert!(input.skip(6));
        assert_eq!(input.position(), 6);
        assert_eq!(drain(&mut input), b"ghij");
    }

    #[test]
    fn skip_past_end_fails() {
        let chunks: Vec<&[u8]> = vec![&b"abc"[..]];
        let mut input = ChunkedInput::new(&chunks);
        assert!(!input.skip(4));
    }

    #[test]
    fn bounded_input_stops_at_limit() {
        let chunks: Vec<&[u8]> = vec![&b"abc"[..], &b"defg"[..], &b"hij"[..]];
        let mut input = ChunkedInput::bounded(&chunks, 5);

        assert_eq!(input.remaining(), 5);
        assert_eq!(drain(&mut input), b"abcde");
        assert_eq!(input.remaining(), 0);
        assert!(!input.skip(1));
    }

    #[test]
    fn remaining_tracks_position() {
        let chunks: Vec<&[u8]> = vec![&b"abc"[..], &b"defg"[..]];
        let mut input = ChunkedInput::new(&chunks);
        assert!(input.skip(2));
        assert_eq!(input.remaining(), 5);
    }

    #[test]
    fn reader_serves_exact_budget() {
        let chunks: Vec<&[u8]> = vec![&b"abc"[..], &b"defg"[..], &b"hij"[..]];
        let mut input = ChunkedInput::new(&chunks);

        let mut out = Vec::new();
        let mut reader = InputReader::new(&mut input, 6);
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"abcdef");
        assert!(!reader.is_exhausted());

        assert_eq!(input.position(), 6);
        assert_eq!(drain(&mut input), b"ghij");
    }

    #[test]
    fn reader_small_reads_back_up_leftovers() {
        let chunks: Vec<&[u8]> = vec![&b"abcdef"[..]];
        let mut input = ChunkedInput::new(&chunks);
        let mut reader = InputReader::new(&mut input, usize::MAX);

        let mut two = [0u8; 2];
        reader.read_exact(&mut two).unwrap();
        assert_eq!(&two, b"ab");
        reader.read_exact(&mut two).unwrap();
        assert_eq!(&two, b"cd");
        assert_eq!(input.position(), 4);
    }

    #[test]
    fn reader_reports_exhaustion() {
        let chunks: Vec<&[u8]> = vec![&b"ab"[..]];
        let mut input = ChunkedInput::new(&chunks);
        let mut reader = InputReader::new(&mut input, 10);

        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"ab");
        assert!(reader.is_exhausted());
        assert_eq!(reader.remaining(), 8);
    }
}
