use crate::error::DecodeError;
use crate::value::{Position, Value};

/// Decoder-side table from position to the reconstructed compound.
///
/// Positions must be declared densely, in the order the encoder assigned them.
#[derive(Debug, Default)]
pub struct BackRefTable {
    slots: Vec<Value>,
}

impl BackRefTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, pos: Position, value: Value) -> Result<(), DecodeError> {
        let expected = self.slots.len() as Position;
        if pos != expected {
            return Err(DecodeError::MalformedToken(format!(
                "compound declared at position {}, expected {}",
                pos, expected
            )));
        }
        self.slots.push(value);
        Ok(())
    }

    /// Shared handle registered at `pos`.
    pub fn resolve(&self, pos: Position) -> Result<Value, DecodeError> {
        usize::try_from(pos)
            .ok()
            .and_then(|i| self.slots.get(i))
            .cloned()
            .ok_or(DecodeError::DanglingReference(pos))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
