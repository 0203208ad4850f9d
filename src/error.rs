use crate::value::Position;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Unsupported scalar: {0}")]
    UnsupportedScalar(String),
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("Dangling reference to position {0}")]
    DanglingReference(Position),

    #[error("Truncated stream")]
    TruncatedStream,

    #[error("Rejected scalar: {0}")]
    RejectedScalar(String),
}

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Cyclic value cannot be represented as JSON")]
    CyclicValue,

    #[error("Non-string mapping key: {0}")]
    NonStringKey(String),

    #[error("Non-finite float: {0}")]
    NonFiniteFloat(f64),

    #[error("Integer out of range: {0}")]
    IntegerOutOfRange(String),
}
