use crate::cobs;
use crate::crc::crc16;
use crate::error::{FrameError, Result};
use crate::types::{
    ARRAY_START, END, FALSE, FLOAT32, MAJOR_BSTR, MAJOR_NINT, MAJOR_STR, MAJOR_UINT, MAP_START,
    MAX_SHORT_LEN, NULL, TRUE,
};

/// Default buffer capacity for encoders and decoders.
pub const DEFAULT_CAPACITY: usize = 256;

/// Types that can be written by [`FrameEncoder::encode`].
pub trait FrameEncode {
    fn encode_to(&self, encoder: &mut FrameEncoder) -> Result<()>;
}

/// Writes the frame CBOR subset into a fixed-capacity buffer.
///
/// Every write is checked against the capacity before any byte is written,
/// so a failed call leaves the buffer as it was.
#[derive(Debug, Clone)]
pub struct FrameEncoder {
    buf: Vec<u8>,
    capacity: usize,
}

impl Default for FrameEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl FrameEncoder {
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Encode any [`FrameEncode`] value.
    pub fn encode<T: FrameEncode + ?Sized>(&mut self, value: &T) -> Result<()> {
        value.encode_to(self)
    }

    pub fn encode_uint(&mut self, value: u64) -> Result<()> {
        self.write_header(MAJOR_UINT, value)
    }

    /// Non-negative values are written as major type 0, negative ones as major type 1.
    pub fn encode_int(&mut self, value: i64) -> Result<()> {
        if value >= 0 {
            self.write_header(MAJOR_UINT, value as u64)
        } else {
            self.write_header(MAJOR_NINT, (-1 - value) as u64)
        }
    }

    pub fn encode_f32(&mut self, value: f32) -> Result<()> {
        let bits = value.to_be_bytes();
        self.write(&[FLOAT32, bits[0], bits[1], bits[2], bits[3]])
    }

    pub fn encode_bool(&mut self, value: bool) -> Result<()> {
        self.write(&[if value { TRUE } else { FALSE }])
    }

    pub fn encode_null(&mut self) -> Result<()> {
        self.write(&[NULL])
    }

    pub fn encode_str(&mut self, value: &str) -> Result<()> {
        self.write_short(MAJOR_STR, value.as_bytes())
    }

    pub fn encode_bytes(&mut self, value: &[u8]) -> Result<()> {
        self.write_short(MAJOR_BSTR, value)
    }

    /// Open an indefinite-length array; close it with [`encode_end`](Self::encode_end).
    pub fn encode_array(&mut self) -> Result<()> {
        self.write(&[ARRAY_START])
    }

    /// Open an indefinite-length map; close it with [`encode_end`](Self::encode_end).
    pub fn encode_map(&mut self) -> Result<()> {
        self.write(&[MAP_START])
    }

    pub fn encode_end(&mut self) -> Result<()> {
        self.write(&[END])
    }

    /// Append the big-endian CRC-16 of everything written so far.
    pub fn add_crc(&mut self) -> Result<()> {
        let crc = crc16(&self.buf);
        self.write(&crc.to_be_bytes())?;
        tracing::trace!(crc, len = self.buf.len(), "crc appended");
        Ok(())
    }

    /// Replace the buffer with its COBS encoding, delimiter included.
    pub fn add_cobs(&mut self) -> Result<()> {
        let encoded = cobs::encode(&self.buf);
        if encoded.len() > self.capacity {
            return Err(FrameError::OutOfSpace {
                needed: encoded.len(),
                capacity: self.capacity,
            });
        }
        tracing::trace!(raw = self.buf.len(), stuffed = encoded.len(), "cobs applied");
        self.buf = encoded;
        Ok(())
    }

    /// Copy the encoded bytes into `dst`, returning the number copied.
    pub fn read_buffer(&self, dst: &mut [u8]) -> Result<usize> {
        if dst.len() < self.buf.len() {
            return Err(FrameError::OutOfSpace {
                needed: self.buf.len(),
                capacity: dst.len(),
            });
        }
        dst[..self.buf.len()].copy_from_slice(&self.buf);
        Ok(self.buf.len())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes that can still be written.
    pub fn remaining(&self) -> usize {
        self.capacity - self.buf.len()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let needed = self.buf.len() + bytes.len();
        if needed > self.capacity {
            return Err(FrameError::OutOfSpace {
                needed,
                capacity: self.capacity,
            });
        }
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn write_header(&mut self, major: u8, arg: u64) -> Result<()> {
        if arg < 24 {
            self.write(&[major | arg as u8])
        } else if arg <= u64::from(u8::MAX) {
            self.write(&[major | 24, arg as u8])
        } else if arg <= u64::from(u16::MAX) {
            let b = (arg as u16).to_be_bytes();
            self.write(&[major | 25, b[0], b[1]])
        } else if arg <= u64::from(u32::MAX) {
            let b = (arg as u32).to_be_bytes();
            self.write(&[major | 26, b[0], b[1], b[2], b[3]])
        } else {
            let b = arg.to_be_bytes();
            self.write(&[major | 27, b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
        }
    }

    // Single header byte `major | len`, no extended length forms.
    fn write_short(&mut self, major: u8, data: &[u8]) -> Result<()> {
        if data.len() > MAX_SHORT_LEN {
            return Err(FrameError::StringTooLong { len: data.len() });
        }
        let needed = self.buf.len() + 1 + data.len();
        if needed > self.capacity {
            return Err(FrameError::OutOfSpace {
                needed,
                capacity: self.capacity,
            });
        }
        self.buf.push(major | data.len() as u8);
        self.buf.extend_from_slice(data);
        Ok(())
    }
}

macro_rules! encode_unsigned {
    ($($t:ty),*) => {
        $(impl FrameEncode for $t {
            fn encode_to(&self, encoder: &mut FrameEncoder) -> Result<()> {
                encoder.encode_uint(u64::from(*self))
            }
        })*
    };
}

macro_rules! encode_signed {
    ($($t:ty),*) => {
        $(impl FrameEncode for $t {
            fn encode_to(&self, encoder: &mut FrameEncoder) -> Result<()> {
                encoder.encode_int(i64::from(*self))
            }
        })*
    };
}

encode_unsigned!(u8, u16, u32, u64);
encode_signed!(i8, i16, i32, i64);

impl FrameEncode for bool {
    fn encode_to(&self, encoder: &mut FrameEncoder) -> Result<()> {
        encoder.encode_bool(*self)
    }
}

impl FrameEncode for f32 {
    fn encode_to(&self, encoder: &mut FrameEncoder) -> Result<()> {
        encoder.encode_f32(*self)
    }
}

impl FrameEncode for str {
    fn encode_to(&self, encoder: &mut FrameEncoder) -> Result<()> {
        encoder.encode_str(self)
    }
}

impl FrameEncode for String {
    fn encode_to(&self, encoder: &mut FrameEncoder) -> Result<()> {
        encoder.encode_str(self)
    }
}

impl FrameEncode for [u8] {
    fn encode_to(&self, encoder: &mut FrameEncoder) -> Result<()> {
        encoder.encode_bytes(self)
    }
}

impl FrameEncode for Vec<u8> {
    fn encode_to(&self, encoder: &mut FrameEncoder) -> Result<()> {
        encoder.encode_bytes(self)
    }
}

impl<T: FrameEncode> FrameEncode for Option<T> {
    fn encode_to(&self, encoder: &mut FrameEncoder) -> Result<()> {
        match self {
            Some(value) => value.encode_to(encoder),
            None => encoder.encode_null(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded<T: FrameEncode + ?Sized>(value: &T) -> Vec<u8> {
        let mut encoder = FrameEncoder::default();
        encoder.encode(value).unwrap();
        encoder.into_vec()
    }

    #[test]
    fn unsigned_length_forms() {
        assert_eq!(encoded(&0u8), vec![0x00]);
        assert_eq!(encoded(&23u8), vec![0x17]);
        assert_eq!(encoded(&24u8), vec![0x18, 0x18]);
        assert_eq!(encoded(&255u16), vec![0x18, 0xFF]);
        assert_eq!(encoded(&256u16), vec![0x19, 0x01, 0x00]);
        assert_eq!(encoded(&65535u32), vec![0x19, 0xFF, 0xFF]);
        assert_eq!(encoded(&65536u32), vec![0x1A, 0x00, 0x01, 0x00, 0x00]);
        assert_eq!(
            encoded(&(1u64 << 32)),
            vec![0x1B, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn signed_values() {
        assert_eq!(encoded(&-1i32), vec![0x20]);
        assert_eq!(encoded(&-24i32), vec![0x37]);
        assert_eq!(encoded(&-25i32), vec![0x38, 0x18]);
        assert_eq!(encoded(&-500i16), vec![0x39, 0x01, 0xF3]);
        assert_eq!(encoded(&7i8), vec![0x07]);
    }

    #[test]
    fn strings_use_single_header_byte() {
        assert_eq!(encoded("abc"), vec![0x63, b'a', b'b', b'c']);
        assert_eq!(encoded(&[1u8, 2][..]), vec![0x42, 1, 2]);
        let long = "x".repeat(31);
        assert_eq!(encoded(long.as_str())[0], 0x7F);
    }

    #[test]
    fn strings_over_31_bytes_rejected() {
        let mut encoder = FrameEncoder::default();
        let err = encoder.encode("y".repeat(32).as_str()).unwrap_err();
        assert!(matches!(err, FrameError::StringTooLong { len: 32 }));
        assert!(encoder.is_empty());
    }

    #[test]
    fn float_bool_null_markers() {
        assert_eq!(encoded(&1.0f32), vec![0xFA, 0x3F, 0x80, 0x00, 0x00]);
        assert_eq!(encoded(&true), vec![0xF5]);
        assert_eq!(encoded(&false), vec![0xF4]);
        assert_eq!(encoded(&None::<u32>), vec![0xF6]);
        assert_eq!(encoded(&Some(5u32)), vec![0x05]);
    }

    #[test]
    fn containers_are_indefinite() {
        let mut encoder = FrameEncoder::default();
        encoder.encode_array().unwrap();
        encoder.encode(&1u8).unwrap();
        encoder.encode_map().unwrap();
        encoder.encode("k").unwrap();
        encoder.encode_null().unwrap();
        encoder.encode_end().unwrap();
        encoder.encode_end().unwrap();
        assert_eq!(
            encoder.as_bytes(),
            &[0x9F, 0x01, 0xBF, 0x61, b'k', 0xF6, 0xFF, 0xFF]
        );
    }

    #[test]
    fn capacity_failure_leaves_buffer_unchanged() {
        let mut encoder = FrameEncoder::new(4);
        encoder.encode(&1u8).unwrap();
        encoder.encode(&2u8).unwrap();
        let before = encoder.as_bytes().to_vec();

        let err = encoder.encode(&70000u32).unwrap_err();
        assert!(matches!(
            err,
            FrameError::OutOfSpace {
                needed: 7,
                capacity: 4
            }
        ));
        assert_eq!(err.code(), crate::error::ENOSPC);
        assert_eq!(encoder.as_bytes(), before.as_slice());

        assert!(encoder.encode("abc").is_err());
        assert_eq!(encoder.as_bytes(), before.as_slice());

        encoder.encode(&3u8).unwrap();
        encoder.encode(&4u8).unwrap();
        assert_eq!(encoder.remaining(), 0);
        assert!(encoder.encode_null().is_err());
    }

    #[test]
    fn crc_and_cobs() {
        let mut encoder = FrameEncoder::default();
        encoder.encode("hi").unwrap();
        encoder.add_crc().unwrap();
        let crc = crc16(&[0x62, b'h', b'i']);
        assert_eq!(&encoder.as_bytes()[3..], &crc.to_be_bytes());

        let raw = encoder.as_bytes().to_vec();
        encoder.add_cobs().unwrap();
        assert_eq!(encoder.as_bytes(), cobs::encode(&raw).as_slice());
        assert_eq!(encoder.as_bytes().last(), Some(&0x00));
    }

    #[test]
    fn cobs_honours_capacity() {
        let mut encoder = FrameEncoder::new(4);
        encoder.encode(&[1u8, 2, 3][..]).unwrap();
        assert!(matches!(
            encoder.add_cobs(),
            Err(FrameError::OutOfSpace { .. })
        ));
        assert_eq!(encoder.as_bytes(), &[0x43, 1, 2, 3]);
    }

    #[test]
    fn read_buffer_copies() {
        let mut encoder = FrameEncoder::default();
        encoder.encode(&42u8).unwrap();
        let mut out = [0u8; 4];
        assert_eq!(encoder.read_buffer(&mut out).unwrap(), 2);
        assert_eq!(&out[..2], &[0x18, 42]);
        assert!(encoder.read_buffer(&mut [0u8; 1]).is_err());

        encoder.clear();
        assert!(encoder.is_empty());
        assert_eq!(encoder.len(), 0);
    }
}
