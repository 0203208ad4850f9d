//! Scalar codec: maps [`Scalar`] to and from the JSON payload of a scalar token.
//!
//! Numbers are classified by their literal text: a literal with `.`, `e` or
//! `E` is a float, anything else is an integer and must fit `i64`.

use crate::error::{DecodeError, EncodeError};
use crate::value::Scalar;
use serde_json::value::RawValue;

pub fn encode(scalar: &Scalar) -> Result<Box<RawValue>, EncodeError> {
    let text = match scalar {
        Scalar::Null => "null".to_string(),
        Scalar::Bool(v) => v.to_string(),
        Scalar::Int(v) => v.to_string(),
        Scalar::Float(v) if v.is_finite() => serde_json::to_string(v)?,
        Scalar::Float(v) => {
            return Err(EncodeError::UnsupportedScalar(format!(
                "non-finite float {}",
                v
            )));
        }
        Scalar::Str(v) => serde_json::to_string(v)?,
    };
    Ok(RawValue::from_string(text)?)
}

pub fn decode(raw: &RawValue) -> Result<Scalar, DecodeError> {
    let text = raw.get().trim();
    match text.as_bytes().first() {
        Some(b'n') => Ok(Scalar::Null),
        Some(b't') => Ok(Scalar::Bool(true)),
        Some(b'f') => Ok(Scalar::Bool(false)),
        Some(b'"') => serde_json::from_str(text)
            .map(Scalar::Str)
            .map_err(|e| DecodeError::RejectedScalar(format!("bad string {}: {}", text, e))),
        Some(b'-' | b'0'..=b'9') => decode_number(text),
        Some(b'[') => Err(DecodeError::RejectedScalar(
            "array is not a scalar".to_string(),
        )),
        Some(b'{') => Err(DecodeError::RejectedScalar(
            "object is not a scalar".to_string(),
        )),
        _ => Err(DecodeError::RejectedScalar(format!(
            "unrecognized scalar {}",
            text
        ))),
    }
}

fn decode_number(text: &str) -> Result<Scalar, DecodeError> {
    if text.contains(['.', 'e', 'E']) {
        match text.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Scalar::Float(v)),
            _ => Err(DecodeError::RejectedScalar(format!(
                "float out of range {}",
                text
            ))),
        }
    } else {
        text.parse::<i64>()
            .map(Scalar::Int)
            .map_err(|_| DecodeError::RejectedScalar(format!("integer out of range {}", text)))
    }
}
