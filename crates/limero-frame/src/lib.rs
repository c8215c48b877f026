//! Bounded frame codec for serial and radio links.
//!
//! Two layers:
//! - [`FrameEncoder`] / [`FrameDecoder`] write and read a compact CBOR
//!   subset (indefinite containers, single-byte string headers, 4-byte
//!   floats) in fixed-capacity buffers, with CRC-16 and COBS helpers.
//! - [`encode_frame`] / [`decode_frame`] and [`FrameReader`] /
//!   [`FrameWriter`] carry arbitrary payloads over a byte stream as
//!   `COBS(payload ++ CRC-16) ++ 0x00`.
//!
//! No allocation beyond the configured capacity, no reads past the buffer.

pub mod cobs;
pub mod codec;
pub mod crc;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod reader;
pub mod types;
pub mod writer;

pub use codec::{decode_frame, encode_frame, FrameConfig, DEFAULT_MAX_FRAME_SIZE};
pub use crc::crc16;
pub use decoder::{FrameDecode, FrameDecoder};
pub use encoder::{FrameEncode, FrameEncoder, DEFAULT_CAPACITY};
pub use error::{FrameError, Result, EFAULT, EINVAL, EIO, ENOSPC};
pub use reader::FrameReader;
pub use types::CborType;
pub use writer::FrameWriter;
