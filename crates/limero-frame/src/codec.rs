use bytes::{BufMut, Bytes, BytesMut};

use crate::cobs::{self, DELIMITER};
use crate::crc::{self, crc16, CRC_LEN};
use crate::error::{FrameError, Result};

/// Default maximum stuffed frame size, delimiter excluded: 1 KiB.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 1024;

/// Encode a payload into one wire frame.
///
/// Wire format:
/// ```text
/// ┌───────────────────────────────────────┬───────────┐
/// │ COBS( payload ++ CRC-16 big-endian )  │ 0x00      │
/// │ (no zero bytes)                       │ delimiter │
/// └───────────────────────────────────────┴───────────┘
/// ```
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) {
    let mut raw = Vec::with_capacity(payload.len() + CRC_LEN);
    raw.extend_from_slice(payload);
    raw.extend_from_slice(&crc16(payload).to_be_bytes());

    let mut stuffed = Vec::with_capacity(cobs::max_encoded_len(raw.len()));
    cobs::encode_into(&raw, &mut stuffed);
    dst.reserve(stuffed.len());
    dst.put_slice(&stuffed);
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a delimiter yet. Empty
/// frames (back-to-back delimiters) are skipped. On success or on a
/// corrupt frame, the frame bytes and its delimiter are consumed.
pub fn decode_frame(src: &mut BytesMut, config: &FrameConfig) -> Result<Option<Bytes>> {
    loop {
        let Some(end) = src.iter().position(|&b| b == DELIMITER) else {
            if src.len() > config.max_frame_size {
                let size = src.len();
                src.clear();
                tracing::warn!(size, max = config.max_frame_size, "discarding oversized frame");
                return Err(FrameError::PayloadTooLarge {
                    size,
                    max: config.max_frame_size,
                });
            }
            return Ok(None); // Need more data
        };

        let frame = src.split_to(end + 1);
        if end == 0 {
            continue;
        }
        if end > config.max_frame_size {
            tracing::warn!(size = end, max = config.max_frame_size, "oversized frame");
            return Err(FrameError::PayloadTooLarge {
                size: end,
                max: config.max_frame_size,
            });
        }

        let mut raw = cobs::try_decode(&frame[..end])?;
        if config.verify_crc {
            crc::verify(&raw)?;
        } else if raw.len() < CRC_LEN {
            return Err(FrameError::FrameTooShort { len: raw.len() });
        }
        raw.truncate(raw.len() - CRC_LEN);
        return Ok(Some(Bytes::from(raw)));
    }
}

/// Configuration for the stream codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum stuffed frame size in bytes, delimiter excluded. Default: 1 KiB.
    pub max_frame_size: usize,
    /// Check the CRC-16 trailer. When false the trailer is stripped unchecked.
    pub verify_crc: bool,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            verify_crc: true,
        }
    }
}
