//! Serde interop for record values.
//!
//! Callers usually model records as plain structs; these conversions move
//! them in and out of the dynamic [`Value`] representation through
//! ciborium's serializer, applying the same canonical rules as the codec
//! (no floats, text field names, sorted maps).

use crate::error::{CodecError, CodecResult};
use crate::value::Value;
use ciborium::value::Value as Cbor;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Converts any serializable type into a record [`Value`].
///
/// # Errors
///
/// Returns an error if the type serializes to a forbidden construct
/// (floats, non-text map keys, integers outside the i64 range).
pub fn to_value<T: Serialize>(value: &T) -> CodecResult<Value> {
    let cbor = Cbor::serialized(value).map_err(|e| CodecError::serde(e.to_string()))?;
    from_ciborium(cbor)
}

/// Converts a record [`Value`] back into a deserializable type.
///
/// # Errors
///
/// Returns an error if the value does not match the target type's shape.
pub fn from_value<T: DeserializeOwned>(value: &Value) -> CodecResult<T> {
    to_ciborium(value)
        .deserialized()
        .map_err(|e| CodecError::serde(e.to_string()))
}

fn from_ciborium(value: Cbor) -> CodecResult<Value> {
    match value {
        Cbor::Null => Ok(Value::Null),
        Cbor::Bool(b) => Ok(Value::Bool(b)),
        Cbor::Integer(n) => i64::try_from(i128::from(n))
            .map(Value::Integer)
            .map_err(|_| CodecError::IntegerOverflow),
        Cbor::Float(_) => Err(CodecError::FloatForbidden),
        Cbor::Bytes(b) => Ok(Value::Bytes(b)),
        Cbor::Text(s) => Ok(Value::Text(s)),
        Cbor::Array(items) => items
            .into_iter()
            .map(from_ciborium)
            .collect::<CodecResult<Vec<_>>>()
            .map(Value::Array),
        Cbor::Map(pairs) => {
            let mut fields = Vec::with_capacity(pairs.len());
            for (key, item) in pairs {
                let Cbor::Text(name) = key else {
                    return Err(CodecError::NonTextMapKey);
                };
                fields.push((name, from_ciborium(item)?));
            }
            Ok(Value::map(fields))
        }
        _ => Err(CodecError::invalid_structure("unsupported CBOR construct")),
    }
}

fn to_ciborium(value: &Value) -> Cbor {
    match value {
        Value::Null => Cbor::Null,
        Value::Bool(b) => Cbor::Bool(*b),
        Value::Integer(n) => Cbor::Integer((*n).into()),
        Value::Text(s) => Cbor::Text(s.clone()),
        Value::Bytes(b) => Cbor::Bytes(b.clone()),
        Value::Array(items) => Cbor::Array(items.iter().map(to_ciborium).collect()),
        Value::Map(pairs) => Cbor::Map(
            pairs
                .iter()
                .map(|(name, item)| (Cbor::Text(name.clone()), to_ciborium(item)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Vehicle {
        id: i64,
        #[serde(rename = "type")]
        kind: String,
        wheels: i64,
    }

    #[test]
    fn struct_round_trips_as_record() {
        let vehicle = Vehicle {
            id: 2,
            kind: "car".into(),
            wheels: 4,
        };

        let value = to_value(&vehicle).unwrap();
        assert_eq!(value.get("type"), Some(&Value::text("car")));
        assert_eq!(value.get("id"), Some(&Value::Integer(2)));

        let back: Vehicle = from_value(&value).unwrap();
        assert_eq!(back, vehicle);
    }

    #[test]
    fn floats_are_rejected() {
        let err = to_value(&1.5f64).unwrap_err();
        assert_eq!(err, CodecError::FloatForbidden);
    }

    #[test]
    fn record_fields_come_out_sorted() {
        #[derive(Serialize)]
        struct Unsorted {
            wheels: i64,
            id: i64,
        }

        let value = to_value(&Unsorted { wheels: 4, id: 1 }).unwrap();
        let names: Vec<&str> = value
            .fields()
            .unwrap()
            .iter()
            .map(|(n, _)| n.as_str())
            .collect();
        assert_eq!(names, vec!["id", "wheels"]);
    }
}
