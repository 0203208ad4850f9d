pub mod backref;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod identity;
pub mod json;
pub mod scalar;
pub mod storage;
pub mod value;
pub mod wire;

pub use decoder::load;
pub use encoder::save;
pub use error::{ConvertError, DecodeError, EncodeError};
pub use value::{Position, Scalar, Value};
