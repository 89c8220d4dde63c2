//! Canonical CBOR encoder.

use crate::value::Value;

/// Encodes a value to canonical CBOR bytes.
///
/// Output is deterministic per RFC 8949 Section 4.2.1: shortest-form
/// integers, definite lengths, map keys sorted by their encoded form.
/// Encoding is infallible because [`Value`] cannot hold floats or other
/// forbidden constructs, and [`Value::map`] maintains the key order.
#[must_use]
pub fn to_canonical_cbor(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_into(value, &mut buf);
    buf
}

fn encode_into(value: &Value, buf: &mut Vec<u8>) {
    match value {
        Value::Null => buf.push(0xf6),
        Value::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        #[allow(clippy::cast_sign_loss)]
        Value::Integer(n) => {
            if *n >= 0 {
                encode_head(0, *n as u64, buf);
            } else {
                // CBOR encodes a negative integer n as the argument -(n+1).
                encode_head(1, (-(n + 1)) as u64, buf);
            }
        }
        Value::Bytes(b) => {
            encode_head(2, b.len() as u64, buf);
            buf.extend_from_slice(b);
        }
        Value::Text(s) => {
            encode_head(3, s.len() as u64, buf);
            buf.extend_from_slice(s.as_bytes());
        }
        Value::Array(items) => {
            encode_head(4, items.len() as u64, buf);
            for item in items {
                encode_into(item, buf);
            }
        }
        Value::Map(pairs) => {
            encode_head(5, pairs.len() as u64, buf);
            for (name, item) in pairs {
                encode_head(3, name.len() as u64, buf);
                buf.extend_from_slice(name.as_bytes());
                encode_into(item, buf);
            }
        }
    }
}

/// Writes a major type head with the shortest-form argument.
#[allow(clippy::cast_possible_truncation)]
fn encode_head(major: u8, value: u64, buf: &mut Vec<u8>) {
    let mt = major << 5;
    if value < 24 {
        buf.push(mt | (value as u8));
    } else if value <= u64::from(u8::MAX) {
        buf.push(mt | 24);
        buf.push(value as u8);
    } else if value <= u64::from(u16::MAX) {
        buf.push(mt | 25);
        buf.extend_from_slice(&(value as u16).to_be_bytes());
    } else if value <= u64::from(u32::MAX) {
        buf.push(mt | 26);
        buf.extend_from_slice(&(value as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&value.to_be_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_use_shortest_form() {
        assert_eq!(to_canonical_cbor(&Value::Integer(0)), vec![0x00]);
        assert_eq!(to_canonical_cbor(&Value::Integer(23)), vec![0x17]);
        assert_eq!(to_canonical_cbor(&Value::Integer(24)), vec![0x18, 24]);
        assert_eq!(to_canonical_cbor(&Value::Integer(-1)), vec![0x20]);
        assert_eq!(to_canonical_cbor(&Value::Integer(256)), vec![0x19, 1, 0]);
    }

    #[test]
    fn identical_maps_encode_identically() {
        let a = Value::map(vec![
            ("wheels".into(), Value::Integer(4)),
            ("id".into(), Value::Integer(2)),
        ]);
        let b = Value::map(vec![
            ("id".into(), Value::Integer(2)),
            ("wheels".into(), Value::Integer(4)),
        ]);
        assert_eq!(to_canonical_cbor(&a), to_canonical_cbor(&b));
    }

    #[test]
    fn min_integer_encodes() {
        // -(i64::MIN + 1) must not overflow.
        let bytes = to_canonical_cbor(&Value::Integer(i64::MIN));
        assert_eq!(bytes[0], 0x3b);
        assert_eq!(bytes.len(), 9);
    }
}
