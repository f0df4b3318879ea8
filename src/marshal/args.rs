//! Transaction argument encoding.
//!
//! # Responsibilities
//! - Represent entry-function arguments as an explicit tagged type
//! - Encode each argument to the byte form the chain's VM binds positionally
//! - Convert loosely-typed quote-service values into tagged arguments
//!
//! # Design Decisions
//! - Callers construct `TxArg` variants directly; the encoder is an
//!   exhaustive match, so every case is testable in isolation
//! - Quote payloads arrive as JSON; `TxArg::from_value` applies a fixed
//!   precedence (hex prefix → integer → integer array) so a numeric
//!   string is never mistaken for an address or vice versa

use serde_json::Value;
use thiserror::Error;

/// Errors raised while converting or encoding arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarshalError {
    /// The value's run-time shape has no argument encoding.
    #[error("unsupported argument type: {shape}")]
    UnsupportedArgumentType { shape: String },

    /// A `0x`-prefixed value contained non-hex characters.
    #[error("invalid hex argument '{value}': {reason}")]
    InvalidHex { value: String, reason: String },
}

/// One entry-function argument, explicitly tagged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxArg {
    /// Raw address or byte-string argument, passed through verbatim.
    Address(Vec<u8>),
    /// Unsigned integer, encoded as 8 bytes little-endian.
    Integer(u64),
    /// Sequence of unsigned integers: ULEB128 length prefix, then each
    /// element as 8 bytes little-endian.
    IntegerArray(Vec<u64>),
}

/// The byte encoding of exactly one argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedArgument(Vec<u8>);

impl EncodedArgument {
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TxArg {
    /// Encode this argument into its positional byte form.
    pub fn encode(&self) -> EncodedArgument {
        let bytes = match self {
            TxArg::Address(raw) => raw.clone(),
            TxArg::Integer(n) => n.to_le_bytes().to_vec(),
            TxArg::IntegerArray(items) => {
                let mut out = uleb128(items.len() as u32);
                for item in items {
                    out.extend_from_slice(&item.to_le_bytes());
                }
                out
            }
        };
        EncodedArgument(bytes)
    }

    /// Convert a loosely-typed JSON value into a tagged argument.
    ///
    /// Precedence is fixed: the `0x` prefix check runs before the numeric
    /// checks, so a hex address is never read as a decimal number and a
    /// bare numeric string is never read as hex bytes.
    pub fn from_value(value: &Value) -> Result<TxArg, MarshalError> {
        if let Value::String(text) = value {
            if let Some(digits) = text.strip_prefix("0x") {
                return decode_hex_arg(text, digits);
            }
        }

        if let Value::Number(number) = value {
            return match number.as_u64() {
                Some(n) => Ok(TxArg::Integer(n)),
                None => Err(MarshalError::UnsupportedArgumentType {
                    shape: format!("out-of-range number {number}"),
                }),
            };
        }

        if let Value::String(text) = value {
            if let Ok(n) = text.parse::<u64>() {
                return Ok(TxArg::Integer(n));
            }
            return Err(MarshalError::UnsupportedArgumentType {
                shape: format!("non-numeric string \"{text}\""),
            });
        }

        if let Value::Array(items) = value {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                let n = item.as_u64().ok_or_else(|| {
                    MarshalError::UnsupportedArgumentType {
                        shape: format!("array element {item}"),
                    }
                })?;
                out.push(n);
            }
            return Ok(TxArg::IntegerArray(out));
        }

        Err(MarshalError::UnsupportedArgumentType {
            shape: shape_of(value).to_string(),
        })
    }
}

fn decode_hex_arg(original: &str, digits: &str) -> Result<TxArg, MarshalError> {
    // Odd-length literals get a leading zero, as the chain SDKs do.
    let padded;
    let digits = if digits.len() % 2 == 1 {
        padded = format!("0{digits}");
        padded.as_str()
    } else {
        digits
    };
    let raw = hex::decode(digits).map_err(|e| MarshalError::InvalidHex {
        value: original.to_string(),
        reason: e.to_string(),
    })?;
    Ok(TxArg::Address(raw))
}

fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Unsigned LEB128 encoding, used for length prefixes.
pub fn uleb128(mut value: u32) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            break;
        }
        out.push(byte | 0x80);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hex_string_encodes_as_raw_bytes_never_integer() {
        // "0x123" has a valid decimal reading; the prefix must win.
        let arg = TxArg::from_value(&json!("0x123")).unwrap();
        assert_eq!(arg, TxArg::Address(vec![0x01, 0x23]));
        assert_eq!(arg.encode().as_slice(), &[0x01, 0x23]);
    }

    #[test]
    fn numeric_string_encodes_as_u64_le() {
        let arg = TxArg::from_value(&json!("42")).unwrap();
        assert_eq!(arg, TxArg::Integer(42));
        assert_eq!(arg.encode().as_slice(), &42u64.to_le_bytes());
    }

    #[test]
    fn json_number_encodes_as_u64_le() {
        let arg = TxArg::from_value(&json!(1_000_000)).unwrap();
        assert_eq!(arg.encode().as_slice(), &1_000_000u64.to_le_bytes());
    }

    #[test]
    fn array_encodes_length_prefix_then_elements() {
        let arg = TxArg::from_value(&json!([1, 2, 3])).unwrap();
        let encoded = arg.encode();
        let mut expected = vec![3u8];
        expected.extend_from_slice(&1u64.to_le_bytes());
        expected.extend_from_slice(&2u64.to_le_bytes());
        expected.extend_from_slice(&3u64.to_le_bytes());
        assert_eq!(encoded.as_slice(), expected.as_slice());
    }

    #[test]
    fn unsupported_shapes_name_themselves() {
        let err = TxArg::from_value(&json!({"a": 1})).unwrap_err();
        assert_eq!(
            err,
            MarshalError::UnsupportedArgumentType {
                shape: "object".to_string()
            }
        );

        let err = TxArg::from_value(&json!(true)).unwrap_err();
        assert!(err.to_string().contains("boolean"));

        let err = TxArg::from_value(&json!("not-a-number")).unwrap_err();
        assert!(err.to_string().contains("not-a-number"));
    }

    #[test]
    fn negative_and_fractional_numbers_are_rejected() {
        assert!(TxArg::from_value(&json!(-5)).is_err());
        assert!(TxArg::from_value(&json!(1.5)).is_err());
    }

    #[test]
    fn invalid_hex_is_reported_with_the_literal() {
        let err = TxArg::from_value(&json!("0xzz")).unwrap_err();
        match err {
            MarshalError::InvalidHex { value, .. } => assert_eq!(value, "0xzz"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn odd_length_hex_gets_a_leading_zero() {
        let arg = TxArg::from_value(&json!("0xabc")).unwrap();
        assert_eq!(arg, TxArg::Address(vec![0x0a, 0xbc]));
    }

    #[test]
    fn uleb128_boundaries() {
        assert_eq!(uleb128(0), vec![0x00]);
        assert_eq!(uleb128(127), vec![0x7f]);
        assert_eq!(uleb128(128), vec![0x80, 0x01]);
        assert_eq!(uleb128(16384), vec![0x80, 0x80, 0x01]);
        assert_eq!(uleb128(624_485), vec![0xe5, 0x8e, 0x26]);
    }

    #[test]
    fn empty_array_is_just_a_zero_length() {
        let arg = TxArg::IntegerArray(vec![]);
        assert_eq!(arg.encode().as_slice(), &[0u8]);
    }
}
