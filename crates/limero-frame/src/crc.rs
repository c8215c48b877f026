//! CRC-16/CCITT-FALSE: poly 0x1021, init 0xFFFF, MSB first, no final XOR.

use crate::error::{FrameError, Result};

/// Size of the big-endian CRC trailer.
pub const CRC_LEN: usize = 2;

const POLY: u16 = 0x1021;
const INIT: u16 = 0xFFFF;

pub fn crc16(data: &[u8]) -> u16 {
    let mut crc = INIT;
    for &byte in data {
        crc ^= u16::from(byte) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ POLY
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Check the trailing CRC of `frame` and return the bytes it covers.
pub fn verify(frame: &[u8]) -> Result<&[u8]> {
    let Some(body_len) = frame.len().checked_sub(CRC_LEN) else {
        return Err(FrameError::FrameTooShort { len: frame.len() });
    };
    let (body, trailer) = frame.split_at(body_len);
    let expected = u16::from_be_bytes([trailer[0], trailer[1]]);
    let actual = crc16(body);
    if expected != actual {
        tracing::debug!(expected, actual, len = frame.len(), "crc mismatch");
        return Err(FrameError::Checksum { expected, actual });
    }
    Ok(body)
}
