//! Prompt templates.

pub mod templates;

pub use templates::{CHARACTER_SLOT, PromptTemplate};
