use crate::types::CborType;

/// I/O error.
pub const EIO: i32 = 5;
/// Bad address; used for checksum failures.
pub const EFAULT: i32 = 14;
/// Invalid argument / malformed input.
pub const EINVAL: i32 = 22;
/// No space left in the frame buffer.
pub const ENOSPC: i32 = 28;

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A write would exceed the buffer capacity. The buffer is left unchanged.
    #[error("frame buffer full ({needed} bytes needed, capacity {capacity})")]
    OutOfSpace { needed: usize, capacity: usize },

    /// A read ran past the readable end of the frame.
    #[error("unexpected end of frame at offset {offset}")]
    UnexpectedEnd { offset: usize },

    /// The next item is not of the requested type.
    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: CborType, found: CborType },

    /// A lead byte outside the frame CBOR subset.
    #[error("unrecognised lead byte 0x{byte:02x} at offset {offset}")]
    UnknownType { byte: u8, offset: usize },

    /// Length/argument encoding (minor 28..=31) not usable here.
    #[error("invalid length encoding (minor {minor}) at offset {offset}")]
    InvalidLength { minor: u8, offset: usize },

    /// Decoded integer does not fit the requested Rust type.
    #[error("integer out of range at offset {offset}")]
    IntegerOverflow { offset: usize },

    /// Strings and byte strings carry their length in a single header byte.
    #[error("string of {len} bytes exceeds the 31 byte header limit")]
    StringTooLong { len: usize },

    #[error("invalid utf-8 in text string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    /// An end marker where an item was expected.
    #[error("end marker outside an indefinite container at offset {offset}")]
    StrayEnd { offset: usize },

    /// Containers nested deeper than [`MAX_DEPTH`](crate::decoder::MAX_DEPTH).
    #[error("nesting deeper than {max} levels")]
    NestingTooDeep { max: usize },

    /// The CRC-16 trailer does not match the frame contents.
    #[error("crc mismatch (frame carries 0x{expected:04x}, computed 0x{actual:04x})")]
    Checksum { expected: u16, actual: u16 },

    /// Fewer bytes than a CRC trailer.
    #[error("frame too short for crc ({len} bytes)")]
    FrameTooShort { len: usize },

    /// A COBS block code points past the end of the data.
    #[error("corrupt cobs data at offset {offset}")]
    Cobs { offset: usize },

    /// Byte unstuffing produced no data.
    #[error("empty frame")]
    EmptyFrame,

    /// The frame exceeds the configured maximum size.
    #[error("frame too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

impl FrameError {
    /// Numeric error code, errno style.
    pub fn code(&self) -> i32 {
        match self {
            FrameError::OutOfSpace { .. }
            | FrameError::FrameTooShort { .. }
            | FrameError::PayloadTooLarge { .. } => ENOSPC,
            FrameError::Checksum { .. } => EFAULT,
            FrameError::Io(_) | FrameError::ConnectionClosed => EIO,
            FrameError::UnexpectedEnd { .. }
            | FrameError::TypeMismatch { .. }
            | FrameError::UnknownType { .. }
            | FrameError::InvalidLength { .. }
            | FrameError::IntegerOverflow { .. }
            | FrameError::StringTooLong { .. }
            | FrameError::InvalidUtf8 { .. }
            | FrameError::StrayEnd { .. }
            | FrameError::NestingTooDeep { .. }
            | FrameError::Cobs { .. }
            | FrameError::EmptyFrame => EINVAL,
        }
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
