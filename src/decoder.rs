use crate::backref::BackRefTable;
use crate::error::DecodeError;
use crate::scalar;
use crate::value::{Mapping, Position, Scalar, Sequence, Value};
use crate::wire::{Token, TokenReader};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::BufRead;
use std::rc::Rc;

/// A container whose start token has been read but not its `end`.
enum Open {
    Sequence(Sequence),
    Mapping {
        map: Mapping,
        pos: Position,
        key: Option<Scalar>,
    },
}

impl Open {
    fn into_value(self) -> Value {
        match self {
            Open::Sequence(seq) => Value::Sequence(seq),
            Open::Mapping { map, .. } => Value::Mapping(map),
        }
    }
}

/// What the grammar accepts next, given the innermost open container.
#[derive(Clone, Copy)]
enum Expect {
    Value,
    ItemOrEnd,
    PairOrEnd,
}

enum Started {
    Done(Value),
    Open(Open),
}

/// Rebuilds a graph from a token stream.
///
/// Each container is registered before its children are decoded, so a
/// reference back to an enclosing container resolves to that same instance.
/// Open containers are kept on an explicit stack; a child is attached to its
/// parent once its `end` has been read.
pub struct Decoder<R: BufRead> {
    reader: TokenReader<R>,
    table: BackRefTable,
    refs: usize,
    max_depth: usize,
}

impl<R: BufRead> Decoder<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: TokenReader::new(source),
            table: BackRefTable::new(),
            refs: 0,
            max_depth: 0,
        }
    }

    /// Decodes exactly one root value; any token after it is an error.
    pub fn decode(mut self) -> Result<Value, DecodeError> {
        let mut open: Vec<Open> = Vec::new();

        let root = loop {
            let expect = match open.last() {
                None => Expect::Value,
                Some(Open::Sequence(_)) => Expect::ItemOrEnd,
                Some(Open::Mapping { key: None, .. }) => Expect::PairOrEnd,
                Some(Open::Mapping { key: Some(_), .. }) => Expect::Value,
            };

            let value = match (expect, self.reader.expect_token()?) {
                (Expect::PairOrEnd, Token::PairKey) => {
                    let key = self.decode_key(&open)?;
                    if let Some(Open::Mapping { key: slot, .. }) = open.last_mut() {
                        *slot = Some(key);
                    }
                    continue;
                }
                (Expect::PairOrEnd | Expect::ItemOrEnd, Token::End) => match open.pop() {
                    Some(container) => container.into_value(),
                    None => continue,
                },
                (Expect::PairOrEnd, token) => {
                    return Err(self.unexpected(&token, "pair_key or end"));
                }
                (_, token) => match self.start(token)? {
                    Started::Done(value) => value,
                    Started::Open(container) => {
                        open.push(container);
                        self.max_depth = self.max_depth.max(open.len());
                        continue;
                    }
                },
            };

            match open.last_mut() {
                None => break value,
                Some(Open::Sequence(seq)) => seq.borrow_mut().push(value),
                Some(Open::Mapping { map, key, .. }) => {
                    if let Some(key) = key.take() {
                        map.borrow_mut().insert(key, value);
                    }
                }
            }
        };

        if let Some(extra) = self.reader.next_token()? {
            return Err(DecodeError::MalformedToken(format!(
                "line {}: unexpected {} after root value",
                self.reader.line(),
                extra.name()
            )));
        }

        log::debug!(
            "decoded {} tokens, {} compound values, {} back-references, depth {}",
            self.reader.line(),
            self.table.len(),
            self.refs,
            self.max_depth
        );
        Ok(root)
    }

    /// Handles a token in value position. Containers are registered here,
    /// before any of their children are read.
    fn start(&mut self, token: Token) -> Result<Started, DecodeError> {
        match token {
            Token::Scalar { value } => Ok(Started::Done(Value::Scalar(scalar::decode(&value)?))),
            Token::SeqStart { pos } => {
                let seq: Sequence = Rc::new(RefCell::new(Vec::new()));
                self.table.register(pos, Value::Sequence(seq.clone()))?;
                Ok(Started::Open(Open::Sequence(seq)))
            }
            Token::MapStart { pos } => {
                let map: Mapping = Rc::new(RefCell::new(BTreeMap::new()));
                self.table.register(pos, Value::Mapping(map.clone()))?;
                Ok(Started::Open(Open::Mapping {
                    map,
                    pos,
                    key: None,
                }))
            }
            Token::Ref { pos } => {
                self.refs += 1;
                self.table.resolve(pos).map(Started::Done)
            }
            Token::PairKey | Token::End => Err(self.unexpected(&token, "a value")),
        }
    }

    /// Reads the key after `pair_key`, rejecting one already present in the
    /// innermost mapping.
    fn decode_key(&mut self, open: &[Open]) -> Result<Scalar, DecodeError> {
        let key = match self.reader.expect_token()? {
            Token::Scalar { value } => scalar::decode(&value)?,
            token => return Err(self.unexpected(&token, "a scalar key")),
        };

        if let Some(Open::Mapping { map, pos, .. }) = open.last() {
            if map.borrow().contains_key(&key) {
                return Err(DecodeError::MalformedToken(format!(
                    "line {}: duplicate key {} in mapping {}",
                    self.reader.line(),
                    key,
                    pos
                )));
            }
        }
        Ok(key)
    }

    fn unexpected(&self, token: &Token, wanted: &str) -> DecodeError {
        DecodeError::MalformedToken(format!(
            "line {}: expected {}, found {}",
            self.reader.line(),
            wanted,
            token.name()
        ))
    }
}

/// Reads a full encoding from `source` and returns the reconstructed root.
pub fn load<R: BufRead>(source: R) -> Result<Value, DecodeError> {
    Decoder::new(source).decode()
}

pub fn from_str(text: &str) -> Result<Value, DecodeError> {
    load(text.as_bytes())
}
