//! Responses of the text generation service.
//!
//! The service answers with one or more generated texts, each optionally
//! carrying an edit script against the document it was prompted with.

use larch_motion::{AnimateError, RawOpcode, Script};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors while reading a generation response.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Invalid generation response: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    #[error("Generation response has no choices")]
    NoChoices,

    #[error("Invalid edit script in generation response: {0}")]
    InvalidEdits(#[from] AnimateError),
}

/// One generated text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Generation {
    pub text: String,
    pub index: u32,
    pub logprobs: f64,
    /// Edit script turning the prompted document into `text`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edits: Option<Vec<RawOpcode>>,
}

/// Body of a generation response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub id: String,
    pub model: String,
    pub choices: Vec<Generation>,
}

impl GenerationResponse {
    pub fn from_json(json: &str) -> Result<Self, GenerationError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Target text and edit script of the first choice.
    pub fn into_target(self) -> Result<(String, Option<Script>), GenerationError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or(GenerationError::NoChoices)?;

        let script = choice.edits.map(Script::try_from).transpose()?;
        Ok((choice.text, script))
    }
}
