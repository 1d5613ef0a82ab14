//! Base-127 variable-length integers.
//!
//! Each byte carries one base-127 digit in its low seven bits, least
//! significant digit first. The high bit (`0x80`) is set on every byte except
//! the last. Zero encodes as a single `0x00`.
//!
//! ```text
//! 300 = 46 + 2 * 127  ->  [0xAE, 0x02]
//! ```

/// Continuation bit set on every byte but the last.
const CONTINUATION: u8 = 0x80;

/// Mask for the digit carried by one byte.
const DIGIT_MASK: u8 = 0x7F;

const RADIX: u64 = 127;

/// Maximum encoded length of a `u32` value.
pub const MAX_VARINT_LEN_U32: usize = max_encoded_len(u32::BITS);

/// Maximum encoded length of a `u64` value.
pub const MAX_VARINT_LEN_U64: usize = max_encoded_len(u64::BITS);

/// Largest encoded length for an unsigned integer of `bits` width.
pub const fn max_encoded_len(bits: u32) -> usize {
    ((bits + 6) / 7) as usize
}

/// Number of bytes `value` occupies once encoded.
pub fn encoded_len(mut value: u64) -> usize {
    let mut len = 0;
    loop {
        value /= RADIX;
        len += 1;
        if value == 0 {
            return len;
        }
    }
}

/// Encode `value` into the front of `dst`, returning the number of bytes written.
///
/// # Panics
///
/// Panics if `dst` is shorter than [`encoded_len`] of `value`.
pub fn encode(mut value: u64, dst: &mut [u8]) -> usize {
    let mut len = 0;
    loop {
        let mut digit = (value % RADIX) as u8;
        value /= RADIX;
        if value != 0 {
            digit |= CONTINUATION;
        }
        dst[len] = digit;
        len += 1;
        if value == 0 {
            return len;
        }
    }
}

/// Encode `value` into a freshly allocated vector.
pub fn encode_to_vec(value: u64) -> Vec<u8> {
    let mut out = vec![0u8; encoded_len(value)];
    encode(value, &mut out);
    out
}

/// Decode a varint from the front of `src`.
///
/// Returns the value and the number of bytes it occupied. Returns `None` if
/// `src` ends before a terminating byte, or if accumulation overflows or stops
/// increasing (a zero leading digit).
pub fn decode(src: &[u8]) -> Option<(u64, usize)> {
    let len = src.iter().position(|byte| byte & CONTINUATION == 0)? + 1;

    if len == 1 && src[0] == 0 {
        return Some((0, 1));
    }

    let mut value = 0u64;
    for &byte in src[..len].iter().rev() {
        let previous = value;
        value = value
            .checked_mul(RADIX)?
            .checked_add(u64::from(byte & DIGIT_MASK))?;
        if value <= previous {
            return None;
        }
    }

    Some((value, len))
}
