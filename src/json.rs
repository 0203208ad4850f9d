//! Conversion between plain JSON documents and object graphs.
//!
//! JSON has no notion of identity: a graph built here has no aliasing, and
//! shared values are duplicated on the way out.

use crate::error::ConvertError;
use crate::value::{Scalar, Value};
use serde_json::{Map, Number, Value as Json};

/// Builds a graph from a JSON document. Integers that do not fit `i64` are
/// rejected rather than widened into floats.
pub fn from_json(json: &Json) -> Result<Value, ConvertError> {
    Ok(match json {
        Json::Null => Value::null(),
        Json::Bool(v) => Value::bool(*v),
        Json::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(v), _) => Value::int(v),
            (None, Some(v)) if n.is_f64() => Value::float(v),
            _ => return Err(ConvertError::IntegerOutOfRange(n.to_string())),
        },
        Json::String(v) => Value::str(v),
        Json::Array(items) => {
            Value::seq(items.iter().map(from_json).collect::<Result<Vec<_>, _>>()?)
        }
        Json::Object(fields) => Value::map(
            fields
                .iter()
                .map(|(k, v)| Ok((Scalar::Str(k.clone()), from_json(v)?)))
                .collect::<Result<Vec<_>, ConvertError>>()?,
        ),
    })
}

pub fn to_json(value: &Value) -> Result<Json, ConvertError> {
    let mut open = Vec::new();
    to_json_inner(value, &mut open)
}

fn to_json_inner(value: &Value, open: &mut Vec<usize>) -> Result<Json, ConvertError> {
    if let Some(id) = value.identity() {
        if open.contains(&id) {
            return Err(ConvertError::CyclicValue);
        }
        open.push(id);
    }

    let out = match value {
        Value::Scalar(s) => return scalar_to_json(s),
        Value::Sequence(seq) => Json::Array(
            seq.borrow()
                .iter()
                .map(|item| to_json_inner(item, open))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Value::Mapping(map) => {
            let mut fields = Map::new();
            for (key, item) in map.borrow().iter() {
                let Scalar::Str(name) = key else {
                    return Err(ConvertError::NonStringKey(key.to_string()));
                };
                fields.insert(name.clone(), to_json_inner(item, open)?);
            }
            Json::Object(fields)
        }
    };

    open.pop();
    Ok(out)
}

fn scalar_to_json(scalar: &Scalar) -> Result<Json, ConvertError> {
    match scalar {
        Scalar::Null => Ok(Json::Null),
        Scalar::Bool(v) => Ok(Json::Bool(*v)),
        Scalar::Int(v) => Ok(Json::Number(Number::from(*v))),
        Scalar::Float(v) => Number::from_f64(*v)
            .map(Json::Number)
            .ok_or(ConvertError::NonFiniteFloat(*v)),
        Scalar::Str(v) => Ok(Json::String(v.clone())),
    }
}
