//! Narrated story planning.

use crate::batch::{UnitDescriptor, reconcile_units};
use crate::content::character::{
    CharacterReference, character_description, default_learning_concept, default_setting,
};
use crate::error::{Result, VisuLearnError};
use crate::parsing::{ParseError, parse_structured};
use serde::{Deserialize, Serialize};
use tracing::debug;
use visulearn_abstraction::ImagePayload;

/// Story segments planned per minute of narration (about 15 s each).
pub const SEGMENTS_PER_MINUTE: u32 = 4;

/// Longest story that can be requested.
pub const MAX_DURATION_MINUTES: u32 = 15;

/// A request for a narrated, illustrated story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryRequest {
    /// Genre: adventure, fantasy, sci-fi or mystery.
    pub story_type: String,
    /// School subject the story teaches.
    pub subject: String,
    /// Target narration length.
    pub duration_minutes: u32,
    /// Age of the child.
    pub age: u32,
    /// Name of the child, who is the hero.
    pub child_name: String,
    /// Role the child plays, e.g. "Curious Scientist".
    pub child_role: String,
    /// Concept to teach; defaults per subject.
    #[serde(default)]
    pub learning_concept: Option<String>,
    /// Where the story happens; defaults per genre.
    #[serde(default)]
    pub story_setting: Option<String>,
    /// Photo or drawing of the character.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_image: Option<ImagePayload>,
}

/// One segment as written by the content model.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct StorySegment {
    #[serde(default)]
    segment_id: u32,
    #[serde(default, alias = "text")]
    narrative_text: String,
    #[serde(default, alias = "image_prompt")]
    image_generation_prompt: String,
}

impl StoryRequest {
    /// Number of segments to plan, at least one.
    pub fn segment_count(&self) -> usize {
        self.duration_minutes.saturating_mul(SEGMENTS_PER_MINUTE).max(1) as usize
    }

    /// The learning concept, falling back to the subject default.
    pub fn resolved_concept(&self) -> String {
        self.learning_concept
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .map_or_else(|| default_learning_concept(&self.subject).to_string(), str::to_string)
    }

    /// The setting, falling back to the genre default.
    pub fn resolved_setting(&self) -> String {
        self.story_setting
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map_or_else(|| default_setting(&self.story_type).to_string(), str::to_string)
    }

    /// Checks the request before any provider call.
    ///
    /// # Errors
    /// Returns `VisuLearnError::Configuration` if the duration is above
    /// [`MAX_DURATION_MINUTES`] or the child's name is blank.
    pub fn validate(&self) -> Result<()> {
        if self.duration_minutes > MAX_DURATION_MINUTES {
            return Err(VisuLearnError::Configuration(format!(
                "story duration must be at most {} minutes, got {}",
                MAX_DURATION_MINUTES, self.duration_minutes
            )));
        }
        if self.child_name.trim().is_empty() {
            return Err(VisuLearnError::Configuration("child name is required".to_string()));
        }
        Ok(())
    }

    /// The character reference, present only when a character image was given.
    pub fn character_reference(&self) -> Option<CharacterReference> {
        self.character_image
            .clone()
            .map(|image| CharacterReference::for_child(&self.child_name, &self.child_role, image))
    }

    /// Prompt for the content planning call.
    pub fn planning_prompt(&self) -> String {
        let description = character_description(&self.child_name, &self.child_role, self.age);
        format!(
            "You are a creative, educational storyteller for children. Write a story script that \
             teaches a learning concept and can be turned into an illustrated, narrated video.\n\n\
             INPUTS\n\
             - subject: \"{subject}\"\n\
             - learning concept: \"{concept}\"\n\
             - genre: \"{genre}\"\n\
             - target age: {age}\n\
             - duration: {minutes} minutes\n\
             - character name: \"{name}\"\n\
             - character role: \"{role}\"\n\
             - character description: \"{description}\"\n\
             - setting: \"{setting}\"\n\n\
             Split the story into exactly {count} sequential segments of about 15 seconds of \
             narration each, in language a {age}-year-old understands.\n\n\
             OUTPUT: a single JSON array. Each element is an object with keys \"segment_id\" \
             (integer from 1), \"narrative_text\" (the narration) and \"image_generation_prompt\" \
             (the scene: action, setting, the character's emotion and pose, an art style such as \
             \"Vibrant cartoon style\", and the placeholder [CHARACTER] wherever the main \
             character appears). The character must look the same in every segment.\n\n\
             Return ONLY the JSON array.",
            subject = self.subject,
            concept = self.resolved_concept(),
            genre = self.story_type,
            age = self.age,
            minutes = self.duration_minutes,
            name = self.child_name,
            role = self.child_role,
            description = description,
            setting = self.resolved_setting(),
            count = self.segment_count(),
        )
    }

    /// Placeholder segment used to pad a short plan.
    pub fn filler_segment(&self, id: u32) -> UnitDescriptor {
        UnitDescriptor::new(
            id,
            format!("{} kept exploring, excited to discover even more.", self.child_name),
            format!(
                "[CHARACTER] continuing the journey in {}, smiling with curiosity. Digital storybook illustration.",
                self.resolved_setting()
            ),
        )
    }

    /// Parses the planning response into exactly [`StoryRequest::segment_count`] descriptors.
    ///
    /// # Errors
    /// Returns `VisuLearnError::Precondition` if the response holds no usable segments.
    pub fn parse_plan(&self, raw: &str) -> Result<Vec<UnitDescriptor>> {
        let segments: Vec<StorySegment> = parse_structured(raw).map_err(precondition)?;

        let descriptors: Vec<UnitDescriptor> = segments
            .into_iter()
            .filter(|s| !s.narrative_text.trim().is_empty())
            .map(|s| UnitDescriptor::new(s.segment_id, s.narrative_text, s.image_generation_prompt))
            .collect();

        if descriptors.is_empty() {
            return Err(VisuLearnError::Precondition("story plan contains no segments".to_string()));
        }

        debug!(received = descriptors.len(), expected = self.segment_count(), "Parsed story plan");
        Ok(reconcile_units(descriptors, self.segment_count(), |id| self.filler_segment(id)))
    }
}

fn precondition(err: ParseError) -> VisuLearnError {
    VisuLearnError::Precondition(format!("could not read content plan: {}", err))
}
