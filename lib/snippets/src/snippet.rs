//! Generated artifact records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a snippet body contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnippetKind {
    /// Source code.
    Code,
    /// Flowchart markup.
    Diagram,
    /// Markdown prose.
    Notes,
}

impl SnippetKind {
    /// Returns the serialized name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Diagram => "diagram",
            Self::Notes => "notes",
        }
    }
}

impl fmt::Display for SnippetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One generated artifact. Built per request and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSnippet {
    /// `{workflow_id}-{suffix}`.
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: SnippetKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Generator that produced the snippet.
    pub source: String,
    pub body: String,
    pub tags: Vec<String>,
    /// Generation timestamp, shared by every snippet of one result.
    pub updated_at: String,
}
