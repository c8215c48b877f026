use crate::cobs;
use crate::crc::{crc16, CRC_LEN};
use crate::encoder::DEFAULT_CAPACITY;
use crate::error::{FrameError, Result};
use crate::types::{CborType, ARRAY_START, END, MAP_START, NULL, TRUE};

/// Maximum container nesting followed by [`FrameDecoder::skip_next`].
pub const MAX_DEPTH: usize = 64;

/// Types that can be read by [`FrameDecoder::decode`].
pub trait FrameDecode: Sized {
    fn decode_from(decoder: &mut FrameDecoder) -> Result<Self>;
}

/// Reads the frame CBOR subset from a received buffer.
///
/// Reads never go past the readable end of the buffer. A failed typed
/// decode leaves the cursor where it was before the call.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    buf: Vec<u8>,
    pos: usize,
    // Readable end; excludes the CRC trailer once `check_crc` succeeded.
    limit: usize,
    capacity: usize,
    crc_checked: bool,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl FrameDecoder {
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            pos: 0,
            limit: 0,
            capacity,
            crc_checked: false,
        }
    }

    /// Decoder holding a copy of `data`, sized to fit it.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut decoder = Self::new(data.len().max(DEFAULT_CAPACITY));
        decoder.buf.extend_from_slice(data);
        decoder.limit = data.len();
        decoder
    }

    /// Replace the buffer contents and rewind.
    pub fn fill_buffer(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > self.capacity {
            return Err(FrameError::OutOfSpace {
                needed: data.len(),
                capacity: self.capacity,
            });
        }
        self.buf.clear();
        self.buf.extend_from_slice(data);
        self.reset_cursor();
        Ok(())
    }

    /// Accumulate one byte from a stream.
    ///
    /// Returns `true` when `byte` is the frame delimiter; the delimiter
    /// itself is not stored.
    pub fn add_byte(&mut self, byte: u8) -> Result<bool> {
        if byte == cobs::DELIMITER {
            return Ok(true);
        }
        if self.buf.len() >= self.capacity {
            return Err(FrameError::OutOfSpace {
                needed: self.buf.len() + 1,
                capacity: self.capacity,
            });
        }
        self.buf.push(byte);
        self.limit = self.buf.len();
        self.crc_checked = false;
        Ok(false)
    }

    /// Undo COBS stuffing of the buffer in place.
    pub fn decode_cobs(&mut self) -> Result<()> {
        let decoded = cobs::try_decode(&self.buf)?;
        if decoded.is_empty() {
            return Err(FrameError::EmptyFrame);
        }
        tracing::trace!(stuffed = self.buf.len(), raw = decoded.len(), "cobs removed");
        self.buf = decoded;
        self.reset_cursor();
        Ok(())
    }

    /// Validate the trailing big-endian CRC-16.
    ///
    /// On success the trailer is excluded from further reads and a cursor
    /// already inside it is pulled back to the end of the body. Repeated
    /// calls are no-ops until the buffer changes.
    pub fn check_crc(&mut self) -> Result<()> {
        if self.crc_checked {
            return Ok(());
        }
        let len = self.limit;
        let Some(body_len) = len.checked_sub(CRC_LEN) else {
            return Err(FrameError::FrameTooShort { len });
        };
        let expected = u16::from_be_bytes([self.buf[body_len], self.buf[body_len + 1]]);
        let actual = crc16(&self.buf[..body_len]);
        if expected != actual {
            tracing::debug!(expected, actual, len, "frame crc mismatch");
            return Err(FrameError::Checksum { expected, actual });
        }
        self.limit = body_len;
        self.pos = self.pos.min(body_len);
        self.crc_checked = true;
        Ok(())
    }

    /// Decode any [`FrameDecode`] value.
    pub fn decode<T: FrameDecode>(&mut self) -> Result<T> {
        let start = self.pos;
        T::decode_from(self).inspect_err(|_| self.pos = start)
    }

    /// `None` when the next item is null, otherwise a decoded `T`.
    pub fn decode_opt<T: FrameDecode>(&mut self) -> Result<Option<T>> {
        self.decode::<Option<T>>()
    }

    pub fn decode_uint(&mut self) -> Result<u64> {
        self.atomic(|d| {
            let offset = d.pos;
            d.expect_type(CborType::Uint)?;
            let header = d.read_next()?;
            d.read_argument(header, offset)
        })
    }

    /// Signed integer; accepts both major type 0 and major type 1.
    pub fn decode_int(&mut self) -> Result<i64> {
        self.atomic(|d| {
            let offset = d.pos;
            let ty = d.peek_type()?;
            if ty != CborType::Uint && ty != CborType::Int {
                return Err(FrameError::TypeMismatch {
                    expected: CborType::Int,
                    found: ty,
                });
            }
            let header = d.read_next()?;
            let arg = d.read_argument(header, offset)?;
            let magnitude =
                i64::try_from(arg).map_err(|_| FrameError::IntegerOverflow { offset })?;
            Ok(if ty == CborType::Uint {
                magnitude
            } else {
                -1 - magnitude
            })
        })
    }

    pub fn decode_f32(&mut self) -> Result<f32> {
        self.atomic(|d| {
            d.expect_type(CborType::Float)?;
            d.pos += 1;
            Ok(f32::from_be_bytes(d.take_array()?))
        })
    }

    /// Accepts single (`0xFA`) and double (`0xFB`) precision.
    pub fn decode_f64(&mut self) -> Result<f64> {
        self.atomic(|d| match d.peek_type()? {
            CborType::Float => {
                d.pos += 1;
                Ok(f64::from(f32::from_be_bytes(d.take_array()?)))
            }
            CborType::Double => {
                d.pos += 1;
                Ok(f64::from_be_bytes(d.take_array()?))
            }
            found => Err(FrameError::TypeMismatch {
                expected: CborType::Double,
                found,
            }),
        })
    }

    pub fn decode_bool(&mut self) -> Result<bool> {
        self.atomic(|d| {
            d.expect_type(CborType::Bool)?;
            Ok(d.read_next()? == TRUE)
        })
    }

    pub fn decode_null(&mut self) -> Result<()> {
        self.atomic(|d| {
            d.expect_type(CborType::Null)?;
            d.pos += 1;
            Ok(())
        })
    }

    pub fn decode_str(&mut self) -> Result<String> {
        self.atomic(|d| {
            let offset = d.pos;
            d.expect_type(CborType::Str)?;
            let len = usize::from(d.read_next()? & 0x1F);
            let bytes = d.take(len)?;
            String::from_utf8(bytes.to_vec()).map_err(|_| FrameError::InvalidUtf8 { offset })
        })
    }

    pub fn decode_bytes(&mut self) -> Result<Vec<u8>> {
        self.atomic(|d| {
            d.expect_type(CborType::Bstr)?;
            let len = usize::from(d.read_next()? & 0x1F);
            Ok(d.take(len)?.to_vec())
        })
    }

    /// Consume an array header.
    ///
    /// Returns `None` for an indefinite array (closed by an end marker) and
    /// the element count for a definite one.
    pub fn decode_array(&mut self) -> Result<Option<u64>> {
        self.decode_container(CborType::Array, ARRAY_START)
    }

    /// Consume a map header; see [`decode_array`](Self::decode_array).
    pub fn decode_map(&mut self) -> Result<Option<u64>> {
        self.decode_container(CborType::Map, MAP_START)
    }

    pub fn decode_end(&mut self) -> Result<()> {
        self.atomic(|d| {
            d.expect_type(CborType::End)?;
            d.pos += 1;
            Ok(())
        })
    }

    /// Skip one complete item, including nested containers.
    pub fn skip_next(&mut self) -> Result<()> {
        self.atomic(|d| d.skip_item(0))
    }

    /// Type of the next item without consuming it.
    pub fn peek_type(&self) -> Result<CborType> {
        let byte = self.peek_next()?;
        CborType::from_lead(byte).ok_or(FrameError::UnknownType {
            byte,
            offset: self.pos,
        })
    }

    /// Next raw byte without consuming it.
    pub fn peek_next(&self) -> Result<u8> {
        if self.pos >= self.limit {
            return Err(FrameError::UnexpectedEnd { offset: self.pos });
        }
        Ok(self.buf[self.pos])
    }

    /// Consume and return the next raw byte.
    pub fn read_next(&mut self) -> Result<u8> {
        let byte = self.peek_next()?;
        self.pos += 1;
        Ok(byte)
    }

    /// Copy the whole buffer into `dst`, returning the number of bytes copied.
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

    /// Offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Readable bytes left before the end (or the CRC trailer).
    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.pos)
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

    /// Move the cursor back to the start of the buffer.
    pub fn rewind(&mut self) {
        self.pos = 0;
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.reset_cursor();
    }

    fn reset_cursor(&mut self) {
        self.pos = 0;
        self.limit = self.buf.len();
        self.crc_checked = false;
    }

    fn atomic<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let start = self.pos;
        f(self).inspect_err(|_| self.pos = start)
    }

    fn expect_type(&self, expected: CborType) -> Result<()> {
        let found = self.peek_type()?;
        if found != expected {
            return Err(FrameError::TypeMismatch { expected, found });
        }
        Ok(())
    }

    fn decode_container(&mut self, expected: CborType, indefinite: u8) -> Result<Option<u64>> {
        self.atomic(|d| {
            let offset = d.pos;
            d.expect_type(expected)?;
            let header = d.read_next()?;
            if header == indefinite {
                Ok(None)
            } else {
                d.read_argument(header, offset).map(Some)
            }
        })
    }

    fn read_argument(&mut self, header: u8, offset: usize) -> Result<u64> {
        let minor = header & 0x1F;
        match minor {
            0..=23 => Ok(u64::from(minor)),
            24 => Ok(u64::from(self.read_next()?)),
            25 => Ok(u64::from(u16::from_be_bytes(self.take_array()?))),
            26 => Ok(u64::from(u32::from_be_bytes(self.take_array()?))),
            27 => Ok(u64::from_be_bytes(self.take_array()?)),
            _ => Err(FrameError::InvalidLength { minor, offset }),
        }
    }

    fn take(&mut self, len: usize) -> Result<&[u8]> {
        if self.remaining() < len {
            return Err(FrameError::UnexpectedEnd { offset: self.limit });
        }
        let start = self.pos;
        self.pos += len;
        Ok(&self.buf[start..self.pos])
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn skip_item(&mut self, depth: usize) -> Result<()> {
        if depth > MAX_DEPTH {
            return Err(FrameError::NestingTooDeep { max: MAX_DEPTH });
        }
        let offset = self.pos;
        let ty = self.peek_type()?;
        let header = self.read_next()?;
        match ty {
            CborType::Uint | CborType::Int => {
                self.read_argument(header, offset)?;
            }
            CborType::Str | CborType::Bstr => {
                self.take(usize::from(header & 0x1F))?;
            }
            CborType::Float => {
                self.take(4)?;
            }
            CborType::Double => {
                self.take(8)?;
            }
            CborType::Null | CborType::Bool => {}
            CborType::End => return Err(FrameError::StrayEnd { offset }),
            CborType::Array | CborType::Map => {
                if header == ARRAY_START || header == MAP_START {
                    while self.peek_next()? != END {
                        self.skip_item(depth + 1)?;
                    }
                    self.pos += 1;
                } else {
                    let count = self.read_argument(header, offset)?;
                    let items = if ty == CborType::Map {
                        count.saturating_mul(2)
                    } else {
                        count
                    };
                    for _ in 0..items {
                        self.skip_item(depth + 1)?;
                    }
                }
            }
        }
        Ok(())
    }
}

macro_rules! decode_unsigned {
    ($($t:ty),*) => {
        $(impl FrameDecode for $t {
            fn decode_from(decoder: &mut FrameDecoder) -> Result<Self> {
                let offset = decoder.position();
                let value = decoder.decode_uint()?;
                <$t>::try_from(value).map_err(|_| FrameError::IntegerOverflow { offset })
            }
        })*
    };
}

macro_rules! decode_signed {
    ($($t:ty),*) => {
        $(impl FrameDecode for $t {
            fn decode_from(decoder: &mut FrameDecoder) -> Result<Self> {
                let offset = decoder.position();
                let value = decoder.decode_int()?;
                <$t>::try_from(value).map_err(|_| FrameError::IntegerOverflow { offset })
            }
        })*
    };
}

decode_unsigned!(u8, u16, u32, u64);
decode_signed!(i8, i16, i32, i64);

impl FrameDecode for bool {
    fn decode_from(decoder: &mut FrameDecoder) -> Result<Self> {
        decoder.decode_bool()
    }
}

impl FrameDecode for f32 {
    fn decode_from(decoder: &mut FrameDecoder) -> Result<Self> {
        decoder.decode_f32()
    }
}

impl FrameDecode for f64 {
    fn decode_from(decoder: &mut FrameDecoder) -> Result<Self> {
        decoder.decode_f64()
    }
}

impl FrameDecode for String {
    fn decode_from(decoder: &mut FrameDecoder) -> Result<Self> {
        decoder.decode_str()
    }
}

impl FrameDecode for Vec<u8> {
    fn decode_from(decoder: &mut FrameDecoder) -> Result<Self> {
        decoder.decode_bytes()
    }
}

impl<T: FrameDecode> FrameDecode for Option<T> {
    fn decode_from(decoder: &mut FrameDecoder) -> Result<Self> {
        if decoder.peek_next()? == NULL {
            decoder.read_next()?;
            return Ok(None);
        }
        T::decode_from(decoder).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::FrameEncoder;

    fn decoder_for(build: impl FnOnce(&mut FrameEncoder)) -> FrameDecoder {
        let mut encoder = FrameEncoder::default();
        build(&mut encoder);
        FrameDecoder::from_bytes(encoder.as_bytes())
    }

    #[test]
    fn decodes_what_the_encoder_writes() {
        let mut decoder = decoder_for(|e| {
            e.encode_array().unwrap();
            e.encode(&300u16).unwrap();
            e.encode(&-7i32).unwrap();
            e.encode("name").unwrap();
            e.encode(&[9u8, 8][..]).unwrap();
            e.encode(&0.5f32).unwrap();
            e.encode(&true).unwrap();
            e.encode(&None::<u8>).unwrap();
            e.encode_end().unwrap();
        });

        assert_eq!(decoder.decode_array().unwrap(), None);
        assert_eq!(decoder.decode::<u16>().unwrap(), 300);
        assert_eq!(decoder.decode::<i32>().unwrap(), -7);
        assert_eq!(decoder.decode::<String>().unwrap(), "name");
        assert_eq!(decoder.decode::<Vec<u8>>().unwrap(), vec![9, 8]);
        assert_eq!(decoder.decode::<f32>().unwrap(), 0.5);
        assert!(decoder.decode::<bool>().unwrap());
        assert_eq!(decoder.decode_opt::<u8>().unwrap(), None);
        decoder.decode_end().unwrap();
        assert_eq!(decoder.remaining(), 0);
    }

    #[test]
    fn peek_classifies_without_consuming() {
        let decoder = FrameDecoder::from_bytes(&[0x39, 0x01, 0x00]);
        assert_eq!(decoder.peek_type().unwrap(), CborType::Int);
        assert_eq!(decoder.peek_next().unwrap(), 0x39);
        assert_eq!(decoder.position(), 0);
    }

    #[test]
    fn unknown_lead_byte() {
        let decoder = FrameDecoder::from_bytes(&[0xC1]);
        assert!(matches!(
            decoder.peek_type(),
            Err(FrameError::UnknownType { byte: 0xC1, offset: 0 })
        ));
    }

    #[test]
    fn type_mismatch_keeps_cursor() {
        let mut decoder = FrameDecoder::from_bytes(&[0x63, b'a', b'b', b'c']);
        let err = decoder.decode::<u32>().unwrap_err();
        assert!(matches!(
            err,
            FrameError::TypeMismatch {
                expected: CborType::Uint,
                found: CborType::Str
            }
        ));
        assert_eq!(err.code(), crate::error::EINVAL);
        assert_eq!(decoder.position(), 0);
        assert_eq!(decoder.decode::<String>().unwrap(), "abc");
    }

    #[test]
    fn truncated_item_keeps_cursor() {
        let mut decoder = FrameDecoder::from_bytes(&[0x01, 0x1A, 0x00, 0x01]);
        assert_eq!(decoder.decode::<u32>().unwrap(), 1);
        assert!(matches!(
            decoder.decode::<u32>(),
            Err(FrameError::UnexpectedEnd { .. })
        ));
        assert_eq!(decoder.position(), 1);

        let mut decoder = FrameDecoder::from_bytes(&[0x65, b'a']);
        assert!(decoder.decode::<String>().is_err());
        assert_eq!(decoder.position(), 0);
    }

    #[test]
    fn narrow_integer_overflow() {
        let mut decoder = FrameDecoder::from_bytes(&[0x19, 0x01, 0x00]);
        assert!(matches!(
            decoder.decode::<u8>(),
            Err(FrameError::IntegerOverflow { offset: 0 })
        ));
        assert_eq!(decoder.position(), 0);
        assert_eq!(decoder.decode::<u16>().unwrap(), 256);
    }

    #[test]
    fn signed_accepts_positive_major_zero() {
        let mut decoder = FrameDecoder::from_bytes(&[0x18, 0x64]);
        assert_eq!(decoder.decode::<i64>().unwrap(), 100);
    }

    #[test]
    fn unsigned_rejects_negative() {
        let mut decoder = FrameDecoder::from_bytes(&[0x20]);
        assert!(matches!(
            decoder.decode::<u32>(),
            Err(FrameError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn f64_accepts_both_widths() {
        let mut data = vec![0xFA];
        data.extend_from_slice(&1.5f32.to_be_bytes());
        data.push(0xFB);
        data.extend_from_slice(&(-2.25f64).to_be_bytes());
        let mut decoder = FrameDecoder::from_bytes(&data);
        assert_eq!(decoder.decode::<f64>().unwrap(), 1.5);
        assert_eq!(decoder.decode::<f64>().unwrap(), -2.25);
    }

    #[test]
    fn option_of_value() {
        let mut decoder = FrameDecoder::from_bytes(&[0xF6, 0x05]);
        assert_eq!(decoder.decode_opt::<u32>().unwrap(), None);
        assert_eq!(decoder.decode_opt::<u32>().unwrap(), Some(5));
    }

    #[test]
    fn definite_containers_report_count() {
        let mut decoder = FrameDecoder::from_bytes(&[0x82, 0x01, 0x02, 0xA1, 0x61, b'k', 0xF6]);
        assert_eq!(decoder.decode_array().unwrap(), Some(2));
        decoder.skip_next().unwrap();
        decoder.skip_next().unwrap();
        assert_eq!(decoder.decode_map().unwrap(), Some(1));
        assert_eq!(decoder.decode::<String>().unwrap(), "k");
        decoder.decode_null().unwrap();
    }

    #[test]
    fn skip_nested_containers() {
        let mut decoder = decoder_for(|e| {
            e.encode_map().unwrap();
            e.encode("list").unwrap();
            e.encode_array().unwrap();
            e.encode(&1u8).unwrap();
            e.encode(&2.0f32).unwrap();
            e.encode_end().unwrap();
            e.encode_end().unwrap();
            e.encode(&77u8).unwrap();
        });
        decoder.skip_next().unwrap();
        assert_eq!(decoder.decode::<u8>().unwrap(), 77);
    }

    #[test]
    fn skip_rejects_stray_end_and_truncation() {
        let mut decoder = FrameDecoder::from_bytes(&[0xFF]);
        assert!(matches!(
            decoder.skip_next(),
            Err(FrameError::StrayEnd { offset: 0 })
        ));

        let mut decoder = FrameDecoder::from_bytes(&[0x9F, 0x01]);
        assert!(matches!(
            decoder.skip_next(),
            Err(FrameError::UnexpectedEnd { .. })
        ));
        assert_eq!(decoder.position(), 0);
    }

    #[test]
    fn skip_depth_limit() {
        let data = vec![0x81; MAX_DEPTH + 2];
        let mut decoder = FrameDecoder::from_bytes(&data);
        assert!(matches!(
            decoder.skip_next(),
            Err(FrameError::NestingTooDeep { .. })
        ));
    }

    #[test]
    fn crc_check_hides_trailer() {
        let mut decoder = decoder_for(|e| {
            e.encode(&5u8).unwrap();
            e.add_crc().unwrap();
        });
        decoder.check_crc().unwrap();
        assert_eq!(decoder.decode::<u8>().unwrap(), 5);
        assert_eq!(decoder.remaining(), 0);
        assert!(matches!(
            decoder.read_next(),
            Err(FrameError::UnexpectedEnd { .. })
        ));
    }

    #[test]
    fn crc_detects_every_single_bit_flip() {
        let mut encoder = FrameEncoder::default();
        encoder.encode("payload").unwrap();
        encoder.encode(&1234u16).unwrap();
        encoder.add_crc().unwrap();
        let frame = encoder.into_vec();

        for bit in 0..frame.len() * 8 {
            let mut corrupted = frame.clone();
            corrupted[bit / 8] ^= 1 << (bit % 8);
            let mut decoder = FrameDecoder::from_bytes(&corrupted);
            assert!(
                matches!(decoder.check_crc(), Err(FrameError::Checksum { .. })),
                "bit {bit} not detected"
            );
        }
    }

    #[test]
    fn crc_on_short_buffer() {
        let mut decoder = FrameDecoder::from_bytes(&[0x01]);
        assert!(matches!(
            decoder.check_crc(),
            Err(FrameError::FrameTooShort { len: 1 })
        ));
    }

    #[test]
    fn byte_stream_accumulation() {
        let mut encoder = FrameEncoder::default();
        encoder.encode(&[0u8, 0, 1][..]).unwrap();
        encoder.add_crc().unwrap();
        encoder.add_cobs().unwrap();

        let mut decoder = FrameDecoder::default();
        let mut complete = false;
        for &byte in encoder.as_bytes() {
            complete = decoder.add_byte(byte).unwrap();
        }
        assert!(complete);
        decoder.decode_cobs().unwrap();
        decoder.check_crc().unwrap();
        assert_eq!(decoder.decode::<Vec<u8>>().unwrap(), vec![0, 0, 1]);
    }

    #[test]
    fn add_byte_overflow() {
        let mut decoder = FrameDecoder::new(2);
        assert!(!decoder.add_byte(1).unwrap());
        assert!(!decoder.add_byte(2).unwrap());
        assert!(matches!(
            decoder.add_byte(3),
            Err(FrameError::OutOfSpace { .. })
        ));
        assert_eq!(decoder.as_bytes(), &[1, 2]);
        assert!(decoder.add_byte(0).unwrap());
    }

    #[test]
    fn decode_cobs_rejects_empty_and_corrupt() {
        let mut decoder = FrameDecoder::from_bytes(&[0x01]);
        assert!(matches!(decoder.decode_cobs(), Err(FrameError::EmptyFrame)));

        let mut decoder = FrameDecoder::from_bytes(&[0x07, 0x01]);
        assert!(matches!(
            decoder.decode_cobs(),
            Err(FrameError::Cobs { .. })
        ));
    }

    #[test]
    fn fill_rewind_clear() {
        let mut decoder = FrameDecoder::new(4);
        assert!(decoder.fill_buffer(&[1, 2, 3, 4, 5]).is_err());
        decoder.fill_buffer(&[0x01, 0x02]).unwrap();
        assert_eq!(decoder.decode::<u8>().unwrap(), 1);
        decoder.rewind();
        assert_eq!(decoder.decode::<u8>().unwrap(), 1);

        let mut out = [0u8; 2];
        assert_eq!(decoder.read_buffer(&mut out).unwrap(), 2);
        assert_eq!(out, [0x01, 0x02]);

        decoder.clear();
        assert!(decoder.is_empty());
        assert!(decoder.peek_next().is_err());
    }

    #[test]
    fn invalid_utf8_string() {
        let mut decoder = FrameDecoder::from_bytes(&[0x62, 0xC3, 0x28]);
        assert!(matches!(
            decoder.decode::<String>(),
            Err(FrameError::InvalidUtf8 { offset: 0 })
        ));
    }

    fn with_crc(body: &[u8]) -> Vec<u8> {
        let mut frame = body.to_vec();
        frame.extend_from_slice(&crc16(body).to_be_bytes());
        frame
    }

    #[test]
    fn check_crc_pulls_cursor_out_of_trailer() {
        let mut decoder = FrameDecoder::from_bytes(&with_crc(&[0x05]));
        while decoder.read_next().is_ok() {}
        assert_eq!(decoder.position(), 3);

        decoder.check_crc().unwrap();
        assert_eq!(decoder.position(), 1);
        assert_eq!(decoder.remaining(), 0);
        assert!(matches!(
            decoder.decode::<u8>(),
            Err(FrameError::UnexpectedEnd { offset: 1 })
        ));
        assert!(decoder.skip_next().is_err());

        decoder.rewind();
        assert_eq!(decoder.decode::<u8>().unwrap(), 5);
        assert_eq!(decoder.remaining(), 0);
    }

    #[test]
    fn check_crc_twice_keeps_body() {
        let mut decoder = FrameDecoder::from_bytes(&with_crc(&[0x05]));
        decoder.check_crc().unwrap();
        decoder.check_crc().unwrap();
        assert_eq!(decoder.remaining(), 1);
        assert_eq!(decoder.decode::<u8>().unwrap(), 5);

        let mut corrupt = with_crc(&[0x06, 0x07]);
        corrupt[0] ^= 0x01;
        decoder.fill_buffer(&corrupt).unwrap();
        assert!(matches!(
            decoder.check_crc(),
            Err(FrameError::Checksum { .. })
        ));

        decoder.fill_buffer(&with_crc(&[0x06, 0x07])).unwrap();
        decoder.check_crc().unwrap();
        decoder.check_crc().unwrap();
        assert_eq!(decoder.decode::<u8>().unwrap(), 6);
        assert_eq!(decoder.decode::<u8>().unwrap(), 7);
    }

    #[test]
    fn short_headers_up_to_31_bytes() {
        for len in 24..=31usize {
            let text = "x".repeat(len);
            let blob = vec![0xAB; len];
            let mut decoder = decoder_for(|e| {
                e.encode_array().unwrap();
                e.encode(text.as_str()).unwrap();
                e.encode(&blob).unwrap();
                e.encode(&7u8).unwrap();
                e.encode_end().unwrap();
            });
            assert_eq!(decoder.as_bytes()[1], 0x60 | len as u8);
            assert_eq!(decoder.as_bytes()[2 + len], 0x40 | len as u8);

            assert_eq!(decoder.decode_array().unwrap(), None);
            assert_eq!(decoder.decode::<String>().unwrap(), text);
            assert_eq!(decoder.decode::<Vec<u8>>().unwrap(), blob);
            assert_eq!(decoder.decode::<u8>().unwrap(), 7);
            decoder.decode_end().unwrap();

            decoder.rewind();
            decoder.decode_array().unwrap();
            decoder.skip_next().unwrap();
            decoder.skip_next().unwrap();
            assert_eq!(decoder.decode::<u8>().unwrap(), 7);

            decoder.rewind();
            decoder.skip_next().unwrap();
            assert_eq!(decoder.remaining(), 0);
        }
    }
}
