//! Lead bytes of the frame CBOR subset.

use std::fmt;

/// Major type 0, unsigned integer.
pub const MAJOR_UINT: u8 = 0x00;
/// Major type 1, negative integer.
pub const MAJOR_NINT: u8 = 0x20;
/// Major type 2, byte string.
pub const MAJOR_BSTR: u8 = 0x40;
/// Major type 3, text string.
pub const MAJOR_STR: u8 = 0x60;
/// Major type 4, array.
pub const MAJOR_ARRAY: u8 = 0x80;
/// Major type 5, map.
pub const MAJOR_MAP: u8 = 0xA0;

/// Indefinite-length array opener.
pub const ARRAY_START: u8 = 0x9F;
/// Indefinite-length map opener.
pub const MAP_START: u8 = 0xBF;
/// Break marker closing an indefinite container.
pub const END: u8 = 0xFF;
pub const FALSE: u8 = 0xF4;
pub const TRUE: u8 = 0xF5;
pub const NULL: u8 = 0xF6;
/// Single-precision float, 4 big-endian bytes follow.
pub const FLOAT32: u8 = 0xFA;
/// Double-precision float, 8 big-endian bytes follow.
pub const FLOAT64: u8 = 0xFB;

/// Longest string or byte string a single header byte can describe.
pub const MAX_SHORT_LEN: usize = 0x1F;

/// Item type announced by a lead byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CborType {
    Uint,
    Int,
    Str,
    Bstr,
    Float,
    Double,
    Array,
    Map,
    End,
    Null,
    Bool,
}

impl CborType {
    /// Classify a lead byte; `None` for bytes outside the subset.
    pub fn from_lead(byte: u8) -> Option<CborType> {
        let ty = match byte {
            FLOAT32 => CborType::Float,
            FLOAT64 => CborType::Double,
            END => CborType::End,
            NULL => CborType::Null,
            FALSE | TRUE => CborType::Bool,
            _ => match byte & 0xE0 {
                MAJOR_UINT => CborType::Uint,
                MAJOR_NINT => CborType::Int,
                MAJOR_BSTR => CborType::Bstr,
                MAJOR_STR => CborType::Str,
                MAJOR_ARRAY => CborType::Array,
                MAJOR_MAP => CborType::Map,
                _ => return None,
            },
        };
        Some(ty)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CborType::Uint => "uint",
            CborType::Int => "int",
            CborType::Str => "str",
            CborType::Bstr => "bstr",
            CborType::Float => "float",
            CborType::Double => "double",
            CborType::Array => "array",
            CborType::Map => "map",
            CborType::End => "end",
            CborType::Null => "null",
            CborType::Bool => "bool",
        }
    }
}

impl fmt::Display for CborType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
