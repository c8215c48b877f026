/// Invalid argument / malformed input.
pub const EINVAL: i32 = 22;

/// Errors that can occur while decoding CBOR or JSON into a [`Value`](crate::Value).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    /// The input ended in the middle of an item.
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEnd { offset: usize },

    /// Indefinite-length items (minor type 31) are not supported.
    #[error("indefinite length items not supported (offset {offset})")]
    IndefiniteLength { offset: usize },

    /// Minor types 28..=30 are reserved by CBOR.
    #[error("reserved minor type {minor} at offset {offset}")]
    ReservedMinor { minor: u8, offset: usize },

    /// Tagged items (major type 6) are rejected.
    #[error("cbor tag {tag} not supported (offset {offset})")]
    UnsupportedTag { tag: u64, offset: usize },

    /// Half-precision floats (major 7, minor 25) are not supported.
    #[error("half-precision float not supported (offset {offset})")]
    HalfFloat { offset: usize },

    /// Major type 7 with a simple value outside false/true/null/undefined.
    #[error("unsupported simple value {minor} at offset {offset}")]
    UnsupportedSimple { minor: u8, offset: usize },

    /// A CBOR map key was not a text string.
    #[error("cbor map key must be a string (offset {offset})")]
    NonStringKey { offset: usize },

    /// An integer does not fit in a signed 64-bit value.
    #[error("integer out of range at offset {offset}")]
    IntegerOverflow { offset: usize },

    /// A text string was not valid UTF-8.
    #[error("invalid utf-8 in text string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    /// Containers nested deeper than the parser allows.
    #[error("nesting deeper than {max} levels at offset {offset}")]
    DepthLimit { max: usize, offset: usize },

    /// JSON syntax violation.
    #[error("json syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: &'static str },
}

impl ValueError {
    /// Numeric error code, errno style.
    ///
    /// Every decode failure is malformed input, so this is always [`EINVAL`].
    pub fn code(&self) -> i32 {
        EINVAL
    }

    /// Byte offset in the input where decoding stopped.
    pub fn offset(&self) -> usize {
        match self {
            ValueError::UnexpectedEnd { offset }
            | ValueError::IndefiniteLength { offset }
            | ValueError::ReservedMinor { offset, .. }
            | ValueError::UnsupportedTag { offset, .. }
            | ValueError::HalfFloat { offset }
            | ValueError::UnsupportedSimple { offset, .. }
            | ValueError::NonStringKey { offset }
            | ValueError::IntegerOverflow { offset }
            | ValueError::InvalidUtf8 { offset }
            | ValueError::DepthLimit { offset, .. }
            | ValueError::Syntax { offset, .. } => *offset,
        }
    }
}

pub type Result<T> = std::result::Result<T, ValueError>;
