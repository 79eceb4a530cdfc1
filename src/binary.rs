use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, warn};

use crate::decoder::{DecodeError, Decoder, Instruction};

/// First rejected line of a file, 1-based.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {source}")]
pub struct LineError {
    pub line: usize,
    #[source]
    pub source: DecodeError,
}

/// Every instruction of one file, decoded in a single pass.
///
/// The file is accepted as a whole or not at all: check [`Listing::is_format_correct`]
/// before trusting any instruction.
#[derive(Debug, Clone)]
pub struct Listing {
    instructions: Vec<Instruction>,
    format_correct: bool,
    error: Option<LineError>,
}

impl Listing {
    /// Decode `text` line by line, stopping at the first line that fails.
    pub fn produce<D: Decoder>(dec: &D, text: &str) -> Self {
        let mut instructions = Vec::new();
        // Split on '\n' only so that a stray '\r' stays visible to the decoder.
        for (idx, line) in text.split_terminator('\n').enumerate() {
            match dec.decode(line) {
                Ok(inst) => instructions.push(inst),
                Err(source) => {
                    let error = LineError { line: idx + 1, source };
                    warn!(%error, "rejecting input");
                    return Self { instructions, format_correct: false, error: Some(error) };
                }
            }
        }
        debug!(count = instructions.len(), "decoded listing");
        Self { instructions, format_correct: true, error: None }
    }

    pub fn load<D: Decoder>(dec: &D, path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Ok(Self::produce(dec, &text))
    }

    pub fn is_format_correct(&self) -> bool {
        self.format_correct
    }

    pub fn error(&self) -> Option<&LineError> {
        self.error.as_ref()
    }

    /// Decoded instructions; only the prefix before the failure when the file was rejected.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// A fresh forward cursor. Cursors are independent of each other.
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor { items: &self.instructions, pos: 0 }
    }
}

#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    items: &'a [Instruction],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Next instruction in input order, or the undefined sentinel once exhausted.
    pub fn next_instruction(&mut self) -> Instruction {
        self.next().cloned().unwrap_or_default()
    }
}

impl<'a> Iterator for Cursor<'a> {
    type Item = &'a Instruction;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.items.get(self.pos)?;
        self.pos += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.items.len() - self.pos;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Cursor<'_> {}

impl<'a> IntoIterator for &'a Listing {
    type Item = &'a Instruction;
    type IntoIter = Cursor<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.cursor()
    }
}
