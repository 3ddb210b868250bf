//! Content planning: requests, planning prompts and plan parsing.

pub mod character;
pub mod comic;
pub mod snap;
pub mod story;

pub use character::{
    CharacterReference, DEFAULT_ROLE, Pronouns, character_description, default_learning_concept,
    default_setting,
};
pub use comic::{ComicPlan, ComicRequest, MAX_PANELS};
pub use snap::{Arrow, Concept, Highlight, ImageAnalysis, Label, SnapLearnRequest, VisualEdits};
pub use story::{MAX_DURATION_MINUTES, SEGMENTS_PER_MINUTE, StoryRequest};
