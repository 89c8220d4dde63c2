//! Canonical CBOR decoder.

use crate::error::{CodecError, CodecResult};
use crate::value::{cmp_field_names, Value};
use std::cmp::Ordering;

/// Decodes a value from canonical CBOR bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not valid canonical CBOR or contain
/// forbidden constructs (floats, tags, indefinite lengths, unsorted or
/// non-text map keys, trailing input).
pub fn from_cbor(bytes: &[u8]) -> CodecResult<Value> {
    let mut decoder = Decoder { data: bytes, pos: 0 };
    let value = decoder.decode()?;
    if decoder.pos != bytes.len() {
        return Err(CodecError::TrailingBytes);
    }
    Ok(value)
}

struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl Decoder<'_> {
    fn decode(&mut self) -> CodecResult<Value> {
        let initial = self.read_byte()?;
        let major = initial >> 5;
        let info = initial & 0x1f;

        match major {
            0 => {
                let n = self.read_argument(info)?;
                i64::try_from(n)
                    .map(Value::Integer)
                    .map_err(|_| CodecError::IntegerOverflow)
            }
            1 => {
                let n = self.read_argument(info)?;
                // Negative integer: the value is -(argument + 1).
                i64::try_from(n)
                    .map(|n| Value::Integer(-n - 1))
                    .map_err(|_| CodecError::IntegerOverflow)
            }
            2 => {
                let len = self.read_length(info)?;
                Ok(Value::Bytes(self.read_bytes(len)?.to_vec()))
            }
            3 => self.decode_text(info).map(Value::Text),
            4 => {
                let len = self.read_length(info)?;
                let mut items = Vec::with_capacity(len.min(1024));
                for _ in 0..len {
                    items.push(self.decode()?);
                }
                Ok(Value::Array(items))
            }
            5 => self.decode_map(info),
            6 => Err(CodecError::invalid_structure("tagged values unsupported")),
            7 => self.decode_simple(info),
            _ => unreachable!(),
        }
    }

    fn decode_text(&mut self, info: u8) -> CodecResult<String> {
        let len = self.read_length(info)?;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::InvalidUtf8)
    }

    fn decode_map(&mut self, info: u8) -> CodecResult<Value> {
        let len = self.read_length(info)?;
        let mut pairs: Vec<(String, Value)> = Vec::with_capacity(len.min(1024));
        for _ in 0..len {
            let key_initial = self.read_byte()?;
            if key_initial >> 5 != 3 {
                return Err(CodecError::NonTextMapKey);
            }
            let name = self.decode_text(key_initial & 0x1f)?;
            if let Some((last, _)) = pairs.last() {
                // Canonical form requires strictly ascending field names.
                if cmp_field_names(last, &name) != Ordering::Less {
                    return Err(CodecError::invalid_structure(
                        "map keys out of canonical order",
                    ));
                }
            }
            let value = self.decode()?;
            pairs.push((name, value));
        }
        Ok(Value::Map(pairs))
    }

    fn decode_simple(&mut self, info: u8) -> CodecResult<Value> {
        match info {
            20 => Ok(Value::Bool(false)),
            21 => Ok(Value::Bool(true)),
            22 => Ok(Value::Null),
            25 | 26 | 27 => Err(CodecError::FloatForbidden),
            31 => Err(CodecError::IndefiniteLengthForbidden),
            _ => Err(CodecError::invalid_structure("unsupported simple value")),
        }
    }

    #[inline]
    fn read_byte(&mut self) -> CodecResult<u8> {
        let byte = *self.data.get(self.pos).ok_or(CodecError::UnexpectedEof)?;
        self.pos += 1;
        Ok(byte)
    }

    #[inline]
    fn read_bytes(&mut self, len: usize) -> CodecResult<&[u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(CodecError::UnexpectedEof)?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn read_length(&mut self, info: u8) -> CodecResult<usize> {
        let len = self.read_argument(info)?;
        usize::try_from(len).map_err(|_| CodecError::IntegerOverflow)
    }

    /// Reads a head argument, validating shortest-form encoding.
    fn read_argument(&mut self, info: u8) -> CodecResult<u64> {
        let non_canonical =
            || CodecError::invalid_structure("argument not in shortest form");
        match info {
            0..=23 => Ok(u64::from(info)),
            24 => {
                let v = self.read_byte()?;
                if v < 24 {
                    return Err(non_canonical());
                }
                Ok(u64::from(v))
            }
            25 => {
                let b = self.read_bytes(2)?;
                let v = u16::from_be_bytes([b[0], b[1]]);
                if u8::try_from(v).is_ok() {
                    return Err(non_canonical());
                }
                Ok(u64::from(v))
            }
            26 => {
                let b = self.read_bytes(4)?;
                let v = u32::from_be_bytes([b[0], b[1], b[2], b[3]]);
                if u16::try_from(v).is_ok() {
                    return Err(non_canonical());
                }
                Ok(u64::from(v))
            }
            27 => {
                let b = self.read_bytes(8)?;
                let v = u64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]);
                if u32::try_from(v).is_ok() {
                    return Err(non_canonical());
                }
                Ok(v)
            }
            28..=30 => Err(CodecError::invalid_structure("reserved additional info")),
            31 => Err(CodecError::IndefiniteLengthForbidden),
            _ => unreachable!(),
        }
    }
}
