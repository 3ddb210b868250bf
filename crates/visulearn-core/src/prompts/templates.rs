//! Image prompt templates with a character slot.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder the content model writes where the main character belongs.
pub const CHARACTER_SLOT: &str = "[CHARACTER]";

/// Prompt template.
///
/// Holds prompt text that may contain the [`CHARACTER_SLOT`] placeholder.
/// Rendering never mutates the template, so the same unit can be rendered
/// again with or without a character.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptTemplate {
    content: String,
}

impl PromptTemplate {
    /// Create a template from a string.
    pub fn from_string(content: impl Into<String>) -> Self {
        Self { content: content.into() }
    }

    /// Get the template content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns true if the template contains the character slot.
    pub fn has_character_slot(&self) -> bool {
        self.content.contains(CHARACTER_SLOT)
    }

    /// Render the template.
    ///
    /// Every occurrence of the slot is replaced with `character` when one is
    /// given; otherwise the text is returned unchanged, placeholder included.
    pub fn render(&self, character: Option<&str>) -> String {
        match character {
            Some(character) => self.content.replace(CHARACTER_SLOT, character),
            None => self.content.clone(),
        }
    }
}

impl From<String> for PromptTemplate {
    fn from(content: String) -> Self {
        Self::from_string(content)
    }
}

impl From<&str> for PromptTemplate {
    fn from(content: &str) -> Self {
        Self::from_string(content)
    }
}

impl fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}
