//! Definite-length CBOR codec for [`Value`] trees.
//!
//! Wire subset:
//! - major types 0-5 and 7, always definite length on output;
//! - floats always written as 8-byte doubles (`0xFB`), single floats accepted on input;
//! - map keys must be text strings;
//! - tags, indefinite-length items and half floats are rejected.

use crate::error::{Result, ValueError};
use crate::value::{Array, Object, Value};

/// Maximum container nesting accepted by the parser.
pub const MAX_DEPTH: usize = 128;

const MAJOR_UNSIGNED: u8 = 0;
const MAJOR_NEGATIVE: u8 = 1;
const MAJOR_BYTES: u8 = 2;
const MAJOR_TEXT: u8 = 3;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_MAP: u8 = 5;
const MAJOR_TAG: u8 = 6;

const FALSE: u8 = 0xF4;
const TRUE: u8 = 0xF5;
const NULL: u8 = 0xF6;
const FLOAT64: u8 = 0xFB;

impl Value {
    /// Serialize this tree to CBOR.
    pub fn to_cbor(&self) -> Vec<u8> {
        let mut out = Vec::new();
        write_value(self, &mut out);
        out
    }

    /// Parse one CBOR item from the start of `data`.
    ///
    /// Bytes after the first complete item are ignored; use [`CborParser`]
    /// directly to learn how many bytes were consumed.
    pub fn from_cbor(data: &[u8]) -> Result<Value> {
        CborParser::new(data).parse().inspect_err(|err| {
            tracing::debug!(error = %err, len = data.len(), "cbor decode failed");
        })
    }
}

/// Write a major type with its argument using the shortest length form.
fn write_header(out: &mut Vec<u8>, major: u8, arg: u64) {
    let major = major << 5;
    if arg < 24 {
        out.push(major | arg as u8);
    } else if arg <= u64::from(u8::MAX) {
        out.push(major | 24);
        out.push(arg as u8);
    } else if arg <= u64::from(u16::MAX) {
        out.push(major | 25);
        out.extend_from_slice(&(arg as u16).to_be_bytes());
    } else if arg <= u64::from(u32::MAX) {
        out.push(major | 26);
        out.extend_from_slice(&(arg as u32).to_be_bytes());
    } else {
        out.push(major | 27);
        out.extend_from_slice(&arg.to_be_bytes());
    }
}

fn write_text(out: &mut Vec<u8>, text: &str) {
    write_header(out, MAJOR_TEXT, text.len() as u64);
    out.extend_from_slice(text.as_bytes());
}

fn write_value(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Null => out.push(NULL),
        Value::Bool(b) => out.push(if *b { TRUE } else { FALSE }),
        Value::Int(i) => {
            if *i >= 0 {
                write_header(out, MAJOR_UNSIGNED, *i as u64);
            } else {
                write_header(out, MAJOR_NEGATIVE, (-1 - *i) as u64);
            }
        }
        Value::Float(f) => {
            out.push(FLOAT64);
            out.extend_from_slice(&f.to_be_bytes());
        }
        Value::String(s) => write_text(out, s),
        Value::Bytes(b) => {
            write_header(out, MAJOR_BYTES, b.len() as u64);
            out.extend_from_slice(b);
        }
        Value::Array(items) => {
            write_header(out, MAJOR_ARRAY, items.len() as u64);
            for item in items {
                write_value(item, out);
            }
        }
        Value::Object(map) => {
            write_header(out, MAJOR_MAP, map.len() as u64);
            for (key, item) in map {
                write_text(out, key);
                write_value(item, out);
            }
        }
    }
}

/// Recursive-descent CBOR parser over a borrowed buffer.
#[derive(Debug)]
pub struct CborParser<'a> {
    data: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> CborParser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            depth: 0,
        }
    }

    /// Offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Parse the next complete item.
    pub fn parse(&mut self) -> Result<Value> {
        self.parse_value()
    }

    fn parse_value(&mut self) -> Result<Value> {
        let start = self.pos;
        let initial = self.read_u8()?;
        let major = initial >> 5;
        let minor = initial & 0x1F;
        let arg = self.read_argument(minor, start)?;

        match major {
            MAJOR_UNSIGNED => i64::try_from(arg)
                .map(Value::Int)
                .map_err(|_| ValueError::IntegerOverflow { offset: start }),
            MAJOR_NEGATIVE => i64::try_from(arg)
                .map(|n| Value::Int(-1 - n))
                .map_err(|_| ValueError::IntegerOverflow { offset: start }),
            MAJOR_BYTES => Ok(Value::Bytes(self.take(arg)?.to_vec())),
            MAJOR_TEXT => self.read_text(arg, start).map(Value::String),
            MAJOR_ARRAY => self.parse_array(arg, start),
            MAJOR_MAP => self.parse_map(arg, start),
            MAJOR_TAG => Err(ValueError::UnsupportedTag {
                tag: arg,
                offset: start,
            }),
            // major type 7
            _ => parse_simple(minor, arg, start),
        }
    }

    fn parse_array(&mut self, len: u64, start: usize) -> Result<Value> {
        self.enter(start)?;
        let mut items = Array::with_capacity(self.capacity_hint(len));
        for _ in 0..len {
            items.push(self.parse_value()?);
        }
        self.depth -= 1;
        Ok(Value::Array(items))
    }

    fn parse_map(&mut self, len: u64, start: usize) -> Result<Value> {
        self.enter(start)?;
        let mut map = Object::with_capacity(self.capacity_hint(len) / 2);
        for _ in 0..len {
            let key = self.parse_key()?;
            let value = self.parse_value()?;
            map.entry(key).or_insert(value);
        }
        self.depth -= 1;
        Ok(Value::Object(map))
    }

    fn parse_key(&mut self) -> Result<String> {
        let start = self.pos;
        let initial = self.read_u8()?;
        if initial >> 5 != MAJOR_TEXT {
            return Err(ValueError::NonStringKey { offset: start });
        }
        let len = self.read_argument(initial & 0x1F, start)?;
        self.read_text(len, start)
    }

    fn read_text(&mut self, len: u64, start: usize) -> Result<String> {
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| ValueError::InvalidUtf8 { offset: start })
    }

    fn read_argument(&mut self, minor: u8, start: usize) -> Result<u64> {
        match minor {
            0..=23 => Ok(u64::from(minor)),
            24 => self.read_uint(1),
            25 => self.read_uint(2),
            26 => self.read_uint(4),
            27 => self.read_uint(8),
            31 => Err(ValueError::IndefiniteLength { offset: start }),
            _ => Err(ValueError::ReservedMinor {
                minor,
                offset: start,
            }),
        }
    }

    fn read_u8(&mut self) -> Result<u8> {
        let byte = *self
            .data
            .get(self.pos)
            .ok_or(ValueError::UnexpectedEnd { offset: self.pos })?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_uint(&mut self, width: usize) -> Result<u64> {
        let bytes = self.take(width as u64)?;
        Ok(bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
    }

    fn take(&mut self, len: u64) -> Result<&'a [u8]> {
        let end = usize::try_from(len)
            .ok()
            .and_then(|len| self.pos.checked_add(len))
            .filter(|end| *end <= self.data.len())
            .ok_or(ValueError::UnexpectedEnd {
                offset: self.data.len(),
            })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn enter(&mut self, start: usize) -> Result<()> {
        if self.depth >= MAX_DEPTH {
            return Err(ValueError::DepthLimit {
                max: MAX_DEPTH,
                offset: start,
            });
        }
        self.depth += 1;
        Ok(())
    }

    // Every item takes at least one byte, so the remaining input bounds
    // any honest element count.
    fn capacity_hint(&self, len: u64) -> usize {
        let remaining = self.data.len() - self.pos;
        usize::try_from(len).map_or(remaining, |len| len.min(remaining))
    }
}

fn parse_simple(minor: u8, arg: u64, start: usize) -> Result<Value> {
    match minor {
        20 => Ok(Value::Bool(false)),
        21 => Ok(Value::Bool(true)),
        // null and undefined
        22 | 23 => Ok(Value::Null),
        25 => Err(ValueError::HalfFloat { offset: start }),
        26 => Ok(Value::Float(f64::from(f32::from_bits(arg as u32)))),
        27 => Ok(Value::Float(f64::from_bits(arg))),
        _ => Err(ValueError::UnsupportedSimple {
            minor,
            offset: start,
        }),
    }
}
