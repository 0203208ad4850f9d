use crate::value::{Position, Value};
use std::collections::HashMap;

/// Encoder-side table from compound identity to its first-seen position.
///
/// Keys are allocation addresses, which stay unique while the graph being
/// encoded is borrowed. Entries are never reassigned.
#[derive(Debug, Default)]
pub struct IdentityTable {
    positions: HashMap<usize, Position>,
    next: Position,
}

impl IdentityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `(position, is_new)` for a compound value, `None` for a scalar.
    pub fn lookup_or_register(&mut self, value: &Value) -> Option<(Position, bool)> {
        let key = value.identity()?;
        if let Some(pos) = self.positions.get(&key) {
            return Some((*pos, false));
        }

        let pos = self.next;
        self.next += 1;
        self.positions.insert(key, pos);
        Some((pos, true))
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
