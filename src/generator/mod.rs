//! AI-assisted drafting — the content generator collaborator.
//!
//! The engine never talks to a model directly; it goes through the
//! [`ContentGenerator`] trait so callers and tests can swap the backend.
//! The shipped implementation is [`gemini::GeminiClient`]. Failures are
//! surfaced, never swallowed: a failed generation or refinement must leave
//! the document untouched (enforced at the call sites in `store`).

pub mod gemini;
pub mod parser;
pub mod prompt;

pub use gemini::*;
pub use parser::*;
pub use prompt::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{DocLevel, Tone};

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Cannot reach the generation service at {0}")]
    Connection(String),

    #[error("Generation request timed out after {0}s")]
    Timeout(u64),

    #[error("Generation service returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("JSON parsing error: {0}")]
    JsonParsing(String),

    #[error("Model returned an empty outline")]
    EmptyOutline,

    #[error("Nothing to refine: the section is empty")]
    NothingToRefine,
}

/// Inputs to a full-document outline generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineRequest {
    pub topic: String,
    pub level: DocLevel,
    pub category: String,
    pub tone: Tone,
    /// Background guidance folded into the prompt, e.g. the standard in force.
    pub context: String,
}

/// One generated section: title plus body text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineSection {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// A generated document outline — an ordered array of sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocOutline {
    pub sections: Vec<OutlineSection>,
}

/// Single-section refinement actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefineAction {
    /// Fix grammar and tighten wording, preserving formatting.
    Polish,
    /// Review for compliance gaps; returns a bulleted finding list.
    Check,
    /// Rewrite in formal official-correspondence style.
    RephraseFormal,
}

impl RefineAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Polish => "polish",
            Self::Check => "check",
            Self::RephraseFormal => "rephrase_formal",
        }
    }
}

/// The opaque, replaceable, fallible drafting collaborator.
pub trait ContentGenerator {
    /// Produce a structured outline for a new document.
    fn generate_outline(&self, request: &OutlineRequest) -> Result<DocOutline, GeneratorError>;

    /// Rework one section's text. On error the caller must keep the
    /// original content untouched.
    fn refine(&self, content: &str, action: RefineAction) -> Result<String, GeneratorError>;
}
