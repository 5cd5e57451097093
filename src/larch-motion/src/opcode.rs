//! Edit script data structures.
//!
//! Positions are character (codepoint) offsets into the original text, never
//! byte or storage offsets.

use serde::{Deserialize, Serialize};

use crate::error::{AnimateError, AnimateResult};

/// One edit instruction against the original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Opcode {
    /// Insert `text` before character `start`.
    #[serde(rename = "insertion")]
    Insert { start: usize, text: String },
    /// Remove characters `start..end`.
    #[serde(rename = "deletion")]
    Delete { start: usize, end: usize },
}

impl Opcode {
    /// Create an insert opcode.
    pub fn insert(start: usize, text: impl Into<String>) -> Self {
        Self::Insert {
            start,
            text: text.into(),
        }
    }

    /// Create a delete opcode.
    pub fn delete(start: usize, end: usize) -> Self {
        Self::Delete { start, end }
    }

    /// Start position in the original text.
    pub fn start(&self) -> usize {
        match self {
            Self::Insert { start, .. } | Self::Delete { start, .. } => *start,
        }
    }

    /// Wire name of this opcode.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Insert { .. } => "insertion",
            Self::Delete { .. } => "deletion",
        }
    }
}

/// Lenient wire form of an opcode, as sent by the generation service.
///
/// Accepts any tag so that an unsupported one surfaces as
/// [`AnimateError::UnknownOpcode`] instead of a generic parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawOpcode {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub start: Option<usize>,
    #[serde(default)]
    pub end: Option<usize>,
    #[serde(default)]
    pub text: Option<String>,
}

impl TryFrom<RawOpcode> for Opcode {
    type Error = AnimateError;

    fn try_from(raw: RawOpcode) -> AnimateResult<Self> {
        let missing = |field| AnimateError::MalformedOpcode {
            tag: raw.kind.clone(),
            field,
        };

        match raw.kind.as_str() {
            "insertion" => Ok(Opcode::Insert {
                start: raw.start.ok_or_else(|| missing("start"))?,
                text: raw.text.clone().ok_or_else(|| missing("text"))?,
            }),
            "deletion" => Ok(Opcode::Delete {
                start: raw.start.ok_or_else(|| missing("start"))?,
                end: raw.end.ok_or_else(|| missing("end"))?,
            }),
            other => Err(AnimateError::unknown_opcode(other)),
        }
    }
}

/// An ordered collection of opcodes.
///
/// Order is only meaningful after [`normalize`](crate::normalize), which
/// sorts by ascending start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Script(Vec<Opcode>);

impl Script {
    /// Create a script from opcodes.
    pub fn new(opcodes: Vec<Opcode>) -> Self {
        Self(opcodes)
    }

    /// Parse a JSON array of wire opcodes.
    pub fn from_json(json: &str) -> AnimateResult<Self> {
        let raw: Vec<RawOpcode> = serde_json::from_str(json)?;
        Self::try_from(raw)
    }

    pub fn opcodes(&self) -> &[Opcode] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Opcode> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<Opcode> {
        self.0
    }
}

impl TryFrom<Vec<RawOpcode>> for Script {
    type Error = AnimateError;

    fn try_from(raw: Vec<RawOpcode>) -> AnimateResult<Self> {
        raw.into_iter().map(Opcode::try_from).collect()
    }
}

impl FromIterator<Opcode> for Script {
    fn from_iter<I: IntoIterator<Item = Opcode>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Script {
    type Item = &'a Opcode;
    type IntoIter = std::slice::Iter<'a, Opcode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
