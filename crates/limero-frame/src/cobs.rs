//! Consistent Overhead Byte Stuffing.
//!
//! Encoded data contains no zero bytes, so a single `0x00` can delimit
//! frames on a byte stream. Each block starts with a code byte `n` followed
//! by `n - 1` data bytes; codes below `0xFF` stand for an implied zero after
//! the block, except for the last block.

use crate::error::{FrameError, Result};

/// Frame delimiter appended by [`encode`].
pub const DELIMITER: u8 = 0x00;

const MAX_CODE: u8 = 0xFF;

/// Worst-case size of [`encode`] output for `len` input bytes, delimiter included.
pub fn max_encoded_len(len: usize) -> usize {
    len + len / 254 + 2
}

/// Stuff `data` and append the delimiter.
pub fn encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(max_encoded_len(data.len()));
    encode_into(data, &mut out);
    out
}

/// Stuff `data` into `out`, delimiter included.
pub fn encode_into(data: &[u8], out: &mut Vec<u8>) {
    let mut code_index = out.len();
    let mut code = 1u8;
    out.push(0);
    for &byte in data {
        if byte == 0 {
            out[code_index] = code;
            code_index = out.len();
            out.push(0);
            code = 1;
        } else {
            out.push(byte);
            code += 1;
            if code == MAX_CODE {
                out[code_index] = code;
                code_index = out.len();
                out.push(0);
                code = 1;
            }
        }
    }
    out[code_index] = code;
    out.push(DELIMITER);
}

/// Undo byte stuffing, stopping at the first delimiter if present.
///
/// Corrupt input yields an empty vector; use [`try_decode`] to tell a
/// corrupt frame from an empty one.
pub fn decode(data: &[u8]) -> Vec<u8> {
    try_decode(data).unwrap_or_default()
}

/// Undo byte stuffing, stopping at the first delimiter if present.
pub fn try_decode(data: &[u8]) -> Result<Vec<u8>> {
    let data = match data.iter().position(|&b| b == DELIMITER) {
        Some(end) => &data[..end],
        None => data,
    };
    let mut out = Vec::with_capacity(data.len());
    let mut index = 0;
    while index < data.len() {
        let code = data[index];
        let start = index + 1;
        let end = start + usize::from(code) - 1;
        if end > data.len() {
            return Err(FrameError::Cobs { offset: index });
        }
        out.extend_from_slice(&data[start..end]);
        index = end;
        if code != MAX_CODE && index < data.len() {
            out.push(0);
        }
    }
    Ok(out)
}
