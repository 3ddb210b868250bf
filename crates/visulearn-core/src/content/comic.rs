//! Comic planning.

use crate::batch::{UnitDescriptor, reconcile_units};
use crate::content::character::{CharacterReference, Pronouns};
use crate::error::{Result, VisuLearnError};
use crate::parsing::parse_structured;
use serde::{Deserialize, Serialize};
use tracing::debug;
use visulearn_abstraction::ImagePayload;

/// Phrase every panel prompt must carry to keep the hero consistent.
const CONSISTENCY_MARKER: &str = "consistent character";

/// Phrase every panel prompt must carry to keep the art style.
const STYLE_MARKER: &str = "comic book style";

/// Most panels a single comic may have.
pub const MAX_PANELS: usize = 20;

/// A request for an educational comic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComicRequest {
    /// Genre, e.g. "superhero".
    pub comic_type: String,
    /// School subject the comic teaches.
    pub subject: String,
    /// Concept to teach.
    pub learning_concept: String,
    /// Where the comic happens.
    pub comic_setting: String,
    /// Exact number of panels.
    pub panels: usize,
    /// Age of the child.
    pub age: u32,
    /// Name of the child, who is the hero.
    pub child_name: String,
    /// Role the child plays.
    pub child_role: String,
    /// Pronouns for dialogue.
    #[serde(default)]
    pub pronouns: Pronouns,
    /// Photo or drawing of the character.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_image: Option<ImagePayload>,
}

/// A planned comic: metadata plus exactly the requested panels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComicPlan {
    /// Comic title.
    pub title: String,
    /// One-line description.
    pub description: String,
    /// Panels, ids `1..=panels`.
    pub panels: Vec<UnitDescriptor>,
}

#[derive(Debug, Deserialize)]
struct RawComic {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    panels: Vec<RawPanel>,
}

#[derive(Debug, Deserialize)]
struct RawPanel {
    #[serde(default)]
    panel_id: u32,
    #[serde(default, alias = "text")]
    panel_text: Option<String>,
    #[serde(default, alias = "image_prompt")]
    image_generation_prompt: Option<String>,
}

impl ComicRequest {
    /// Checks the request before any provider call.
    ///
    /// # Errors
    /// Returns `VisuLearnError::Configuration` for a panel count outside
    /// `1..=MAX_PANELS` or a blank name.
    pub fn validate(&self) -> Result<()> {
        if self.panels == 0 {
            return Err(VisuLearnError::Configuration("panel count must be at least 1".to_string()));
        }
        if self.panels > MAX_PANELS {
            return Err(VisuLearnError::Configuration(format!(
                "panel count must be at most {}, got {}",
                MAX_PANELS, self.panels
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
        let name = &self.child_name;
        let count = self.panels;
        format!(
            "You are a comic book artist and writer making educational comics for children.\n\n\
             Create a comic with EXACTLY {count} panels as strict JSON.\n\n\
             - Hero: {name} the {role} (age {age}, pronouns {pronouns})\n\
             - Genre: {genre}\n\
             - Subject: {subject}\n\
             - Learning concept: {concept}\n\
             - Setting: {setting}\n\n\
             OUTPUT FORMAT:\n\
             {{\"title\": \"...\", \"description\": \"...\", \"panels\": [{{\"panel_id\": 1, \
             \"panel_text\": \"dialogue or narration with speech bubble cues and sound effects\", \
             \"image_generation_prompt\": \"detailed image prompt\"}}]}}\n\n\
             RULES:\n\
             1. Exactly {count} panels with panel_id 1..{count} in order.\n\
             2. {name} appears in every panel with identical features and costume.\n\
             3. Use the pronouns {pronouns} correctly.\n\
             4. Every image_generation_prompt includes \"consistent character design\" and \
             \"same {name} as previous panels\".\n\
             5. Every panel is set in {setting} and teaches part of \"{concept}\": hook, \
             prediction, exploration, explanation, recap.\n\
             6. Keep it kind and age-appropriate for {age}-year-olds.\n\
             7. Output ONLY the JSON object.",
            role = self.child_role,
            age = self.age,
            pronouns = self.pronouns.triple(),
            genre = self.comic_type,
            subject = self.subject,
            concept = self.learning_concept,
            setting = self.comic_setting,
        )
    }

    /// Placeholder panel used to pad a short plan.
    pub fn filler_panel(&self, id: u32) -> UnitDescriptor {
        UnitDescriptor::new(
            id,
            format!("{}: \"Let's continue our adventure!\"", self.child_name),
            format!(
                "Comic book style illustration of {} the {}, consistent character design with previous panels, \
                 same clothing and appearance, set in {}, vibrant colors, bold comic outlines, speech bubble.",
                self.child_name, self.child_role, self.comic_setting
            ),
        )
    }

    /// Adds the consistency clause and style prefix a panel prompt is missing.
    ///
    /// Both checks ignore case.
    pub fn normalize_panel_prompt(&self, prompt: &str) -> String {
        let mut prompt = prompt.trim().to_string();
        if !prompt.to_lowercase().contains(CONSISTENCY_MARKER) {
            prompt = format!(
                "{}. CRITICAL: Maintain consistent character design - same {} with identical physical features, \
                 clothing, and appearance as all previous panels.",
                prompt.trim_end_matches('.'),
                self.child_name
            );
        }
        if !prompt.to_lowercase().contains(STYLE_MARKER) {
            prompt = format!("Comic book style illustration: {}", prompt);
        }
        prompt
    }

    /// Parses the planning response into a plan with exactly `panels` panels.
    ///
    /// # Errors
    /// Returns `VisuLearnError::Precondition` if the response holds no panels.
    pub fn parse_plan(&self, raw: &str) -> Result<ComicPlan> {
        let comic: RawComic = parse_structured(raw)
            .map_err(|e| VisuLearnError::Precondition(format!("could not read comic plan: {}", e)))?;

        if comic.panels.is_empty() {
            return Err(VisuLearnError::Precondition("comic plan contains no panels".to_string()));
        }
        debug!(received = comic.panels.len(), expected = self.panels, "Parsed comic plan");

        let descriptors = comic
            .panels
            .into_iter()
            .enumerate()
            .map(|(index, panel)| {
                let text = panel
                    .panel_text
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| format!("{}: \"Panel {}\"", self.child_name, index + 1));
                let prompt = panel
                    .image_generation_prompt
                    .filter(|p| !p.trim().is_empty())
                    .unwrap_or_else(|| format!("Comic panel showing {} the {}", self.child_name, self.child_role));
                UnitDescriptor::new(panel.panel_id, text, prompt)
            })
            .collect();

        let panels = reconcile_units(descriptors, self.panels, |id| self.filler_panel(id))
            .into_iter()
            .map(|mut panel| {
                panel.image_prompt = self.normalize_panel_prompt(panel.image_prompt.content()).into();
                panel
            })
            .collect();

        Ok(ComicPlan { title: comic.title, description: comic.description, panels })
    }
}
