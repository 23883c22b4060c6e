//! Content items carried in tool results.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single content item. Every seqkit tool produces text, so only the text
/// variant is modelled.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Content {
    Text { text: String },
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
        }
    }
}
