use crate::error::EncodeError;
use crate::identity::IdentityTable;
use crate::scalar;
use crate::value::{Position, Scalar, Value};
use crate::wire::{Token, TokenWriter};
use std::io::Write;

/// Children still to be written for a compound whose start token is out.
enum Frame {
    Sequence(std::vec::IntoIter<Value>),
    Mapping(std::vec::IntoIter<(Scalar, Value)>),
}

/// Depth-first, pre-order graph walker.
///
/// A compound is registered before its children are visited, so reaching it
/// again from inside its own body (a cycle) emits a back-reference instead
/// of descending. Open compounds live on an explicit stack, so nesting depth
/// is bounded by memory rather than by the call stack.
pub struct Encoder<W: Write> {
    writer: TokenWriter<W>,
    table: IdentityTable,
    refs: usize,
}

impl<W: Write> Encoder<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: TokenWriter::new(sink),
            table: IdentityTable::new(),
            refs: 0,
        }
    }

    /// Encodes `root` and returns the flushed sink.
    pub fn encode(mut self, root: &Value) -> Result<W, EncodeError> {
        let mut stack: Vec<Frame> = Vec::new();
        if let Some(frame) = self.open(root)? {
            stack.push(frame);
        }

        while let Some(frame) = stack.last_mut() {
            let next = match frame {
                Frame::Sequence(items) => items.next(),
                Frame::Mapping(entries) => match entries.next() {
                    Some((key, item)) => {
                        self.writer.write(&Token::PairKey)?;
                        self.write_scalar(&key)?;
                        Some(item)
                    }
                    None => None,
                },
            };

            match next {
                Some(item) => {
                    if let Some(child) = self.open(&item)? {
                        stack.push(child);
                    }
                }
                None => {
                    stack.pop();
                    self.writer.write(&Token::End)?;
                }
            }
        }

        log::debug!(
            "encoded {} tokens, {} compound values, {} back-references",
            self.writer.written(),
            self.table.len(),
            self.refs
        );
        self.writer.finish()
    }

    /// Writes the leading token for `value`. Returns the frame to descend
    /// into for a first visit of a compound, `None` otherwise.
    fn open(&mut self, value: &Value) -> Result<Option<Frame>, EncodeError> {
        match value {
            Value::Scalar(s) => {
                self.write_scalar(s)?;
                Ok(None)
            }
            Value::Sequence(seq) => {
                let Some(pos) = self.enter(value)? else {
                    return Ok(None);
                };
                self.writer.write(&Token::SeqStart { pos })?;
                Ok(Some(Frame::Sequence(seq.borrow().clone().into_iter())))
            }
            Value::Mapping(map) => {
                let Some(pos) = self.enter(value)? else {
                    return Ok(None);
                };
                self.writer.write(&Token::MapStart { pos })?;
                let entries = map
                    .borrow()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect::<Vec<_>>();
                Ok(Some(Frame::Mapping(entries.into_iter())))
            }
        }
    }

    /// Position to open for a first visit; on a revisit the back-reference
    /// is written here and `None` returned.
    fn enter(&mut self, value: &Value) -> Result<Option<Position>, EncodeError> {
        match self.table.lookup_or_register(value) {
            Some((pos, true)) => Ok(Some(pos)),
            Some((pos, false)) => {
                self.refs += 1;
                self.writer.write(&Token::Ref { pos })?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn write_scalar(&mut self, s: &Scalar) -> Result<(), EncodeError> {
        self.writer.write(&Token::Scalar {
            value: scalar::encode(s)?,
        })
    }
}

/// Writes the full encoding of `value` to `sink`.
pub fn save<W: Write>(value: &Value, sink: W) -> Result<(), EncodeError> {
    Encoder::new(sink).encode(value)?;
    Ok(())
}

/// Encodes `value` into an in-memory token stream.
pub fn to_string(value: &Value) -> Result<String, EncodeError> {
    let bytes = Encoder::new(Vec::new()).encode(value)?;
    String::from_utf8(bytes).map_err(|e| EncodeError::Io(std::io::Error::other(e)))
}
