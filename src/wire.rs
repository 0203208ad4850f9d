//! Token stream framing: one JSON object per line, tagged by `op`.
//!
//! Scalar payloads are kept as raw JSON text so the scalar codec sees the
//! literal exactly as written (an integer too wide for `i64` must not be
//! widened into a float on the way in).

use crate::error::{DecodeError, EncodeError};
use crate::value::Position;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Token {
    Scalar { value: Box<RawValue> },
    SeqStart { pos: Position },
    MapStart { pos: Position },
    PairKey,
    End,
    Ref { pos: Position },
}

impl Token {
    pub fn name(&self) -> &'static str {
        match self {
            Token::Scalar { .. } => "scalar",
            Token::SeqStart { .. } => "seq_start",
            Token::MapStart { .. } => "map_start",
            Token::PairKey => "pair_key",
            Token::End => "end",
            Token::Ref { .. } => "ref",
        }
    }

    /// Parses one framed line.
    pub fn parse(line: &str) -> Result<Token, String> {
        let mut fields: BTreeMap<String, Box<RawValue>> =
            serde_json::from_str(line).map_err(|e| e.to_string())?;
        let op: String = take_field(&mut fields, "op")?;

        let token = match op.as_str() {
            "scalar" => Token::Scalar {
                value: fields
                    .remove("value")
                    .ok_or_else(|| "missing field `value`".to_string())?,
            },
            "seq_start" => Token::SeqStart {
                pos: take_field(&mut fields, "pos")?,
            },
            "map_start" => Token::MapStart {
                pos: take_field(&mut fields, "pos")?,
            },
            "pair_key" => Token::PairKey,
            "end" => Token::End,
            "ref" => Token::Ref {
                pos: take_field(&mut fields, "pos")?,
            },
            other => return Err(format!("unknown op `{}`", other)),
        };

        if let Some(extra) = fields.keys().next() {
            return Err(format!("unexpected field `{}` for {}", extra, op));
        }
        Ok(token)
    }
}

fn take_field<T: DeserializeOwned>(
    fields: &mut BTreeMap<String, Box<RawValue>>,
    name: &str,
) -> Result<T, String> {
    let raw = fields
        .remove(name)
        .ok_or_else(|| format!("missing field `{}`", name))?;
    serde_json::from_str(raw.get()).map_err(|e| format!("field `{}`: {}", name, e))
}

pub struct TokenWriter<W: Write> {
    sink: W,
    written: usize,
}

impl<W: Write> TokenWriter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink, written: 0 }
    }

    pub fn write(&mut self, token: &Token) -> Result<(), EncodeError> {
        log::trace!("emit #{} {:?}", self.written, token);
        serde_json::to_writer(&mut self.sink, token)?;
        self.sink.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn finish(mut self) -> Result<W, EncodeError> {
        self.sink.flush()?;
        Ok(self.sink)
    }
}

pub struct TokenReader<R: BufRead> {
    source: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> TokenReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            line: 0,
            buf: String::new(),
        }
    }

    /// Next token, or `None` once the source is exhausted.
    pub fn next_token(&mut self) -> Result<Option<Token>, DecodeError> {
        self.buf.clear();
        if self.source.read_line(&mut self.buf)? == 0 {
            return Ok(None);
        }
        self.line += 1;

        let text = self.buf.trim_end_matches(['\n', '\r']);
        let token = Token::parse(text)
            .map_err(|e| DecodeError::MalformedToken(format!("line {}: {}", self.line, e)))?;
        log::trace!("read #{} {:?}", self.line, token);
        Ok(Some(token))
    }

    /// Next token where the grammar still expects one.
    pub fn expect_token(&mut self) -> Result<Token, DecodeError> {
        self.next_token()?.ok_or(DecodeError::TruncatedStream)
    }

    /// Number of lines consumed so far.
    pub fn line(&self) -> usize {
        self.line
    }
}
