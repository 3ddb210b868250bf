//! The child's character: description table, pronouns and reference image.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::str::FromStr;
use visulearn_abstraction::ImagePayload;

/// Role used when the requested role is not in the table.
pub const DEFAULT_ROLE: &str = "Brave Explorer";

/// Builds the visual description of the child for a given role.
///
/// Unknown roles fall back to the [`DEFAULT_ROLE`] description.
pub fn character_description(name: &str, role: &str, age: u32) -> String {
    let look = match role {
        "Curious Scientist" => {
            "with inquisitive eyes behind round glasses. Wearing a white lab coat over colorful clothes, with messy hair from experiments. Carries a small notebook and magnifying glass, always with a thoughtful, wondering expression."
        }
        "Magical Wizard" => {
            "with sparkling, mystical eyes. Wearing a purple wizard robe with silver stars, a pointed hat, and carrying a small wooden wand. Has flowing hair and a wise, magical smile with an aura of wonder."
        }
        "Space Astronaut" => {
            "with bright, curious eyes full of wonder. Wearing a silver spacesuit with colorful patches and a clear helmet. Has an excited, adventurous expression and often points toward the stars with enthusiasm."
        }
        "Detective" => {
            "with sharp, observant eyes. Wearing a detective coat, carrying a magnifying glass and small notebook. Has neat hair and a serious but friendly expression, always ready to solve mysteries."
        }
        "Nature Guardian" => {
            "with kind, gentle eyes. Wearing earth-toned clothes with leaf patterns, flower crown, and carrying a small watering can. Has a caring, nurturing expression and seems to glow with natural energy."
        }
        "Time Traveler" => {
            "with wise, adventurous eyes. Wearing a mix of clothing from different eras: a steampunk vest, modern sneakers, and a vintage cap. Carries a glowing pocket watch and has an excited, curious expression."
        }
        "Inventor" => {
            "with creative, intelligent eyes. Wearing overalls covered in colorful paint and small gadgets. Has slightly messy hair from working and carries a toolbox full of imaginative inventions. Always has an innovative, excited expression."
        }
        _ => {
            "with bright, adventurous eyes and a confident smile. Wearing a khaki explorer's vest with many pockets, sturdy boots, and carrying a small compass. Has an eager, determined expression and stands with hands on hips ready for adventure."
        }
    };

    format!("A {}-year-old child named {} {}", age, name, look)
}

/// Default learning concept for a school subject.
pub fn default_learning_concept(subject: &str) -> &'static str {
    match subject.to_lowercase().as_str() {
        "physics" => "How forces and energy work in our world",
        "mathematics" | "math" => "How numbers and patterns help us solve problems",
        "chemistry" => "How different materials mix and change",
        "biology" => "How living things grow and survive",
        "geography" => "How our planet Earth works and changes",
        "history" => "How people lived and what we can learn from the past",
        _ => "How science helps us understand the world",
    }
}

/// Default setting for a story genre; unknown genres get the adventure setting.
pub fn default_setting(genre: &str) -> &'static str {
    match genre.to_lowercase().as_str() {
        "fantasy" => "A magical realm with talking animals, enchanted forests, and sparkling castles in the clouds",
        "sci-fi" | "scifi" | "science fiction" => {
            "A futuristic world with flying cars, robot friends, and amazing space stations among the stars"
        }
        "mystery" => "A curious town with secret passages, hidden clues, and mysterious but friendly characters",
        _ => "A vast, colorful world with mountains, forests, and hidden treasures waiting to be discovered",
    }
}

/// Pronouns used for the character in dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pronouns {
    /// he/him/his
    He,
    /// she/her/her
    She,
    /// it/it/its
    It,
    /// they/them/their
    #[default]
    They,
}

impl Pronouns {
    /// Subject form.
    pub const fn subject(self) -> &'static str {
        match self {
            Self::He => "he",
            Self::She => "she",
            Self::It => "it",
            Self::They => "they",
        }
    }

    /// Object form.
    pub const fn object(self) -> &'static str {
        match self {
            Self::He => "him",
            Self::She => "her",
            Self::It => "it",
            Self::They => "them",
        }
    }

    /// Possessive form.
    pub const fn possessive(self) -> &'static str {
        match self {
            Self::He => "his",
            Self::She => "her",
            Self::It => "its",
            Self::They => "their",
        }
    }

    /// "subject/object/possessive", e.g. "she/her/her".
    pub fn triple(self) -> String {
        format!("{}/{}/{}", self.subject(), self.object(), self.possessive())
    }
}

impl FromStr for Pronouns {
    type Err = Infallible;

    /// Anything unrecognized reads as `They`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "he" | "him" | "his" | "he/him" => Self::He,
            "she" | "her" | "she/her" => Self::She,
            "it" | "its" => Self::It,
            _ => Self::They,
        })
    }
}

/// What the image provider needs to draw the same character every time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterReference {
    /// Substituted into the character slot of image prompts.
    pub description: String,
    /// Sent alongside every image request.
    pub image: ImagePayload,
}

impl CharacterReference {
    /// Create a reference.
    pub fn new(description: impl Into<String>, image: ImagePayload) -> Self {
        Self { description: description.into(), image }
    }

    /// Reference for a named child in a role, described as "<name> the <role>".
    pub fn for_child(name: &str, role: &str, image: ImagePayload) -> Self {
        Self::new(format!("{} the {}", name, role), image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_role_description() {
        let description = character_description("Ada", "Inventor", 8);
        assert!(description.starts_with("A 8-year-old child named Ada with creative"));
        assert!(description.contains("toolbox"));
    }

    #[test]
    fn test_unknown_role_falls_back_to_explorer() {
        let description = character_description("Leo", "Pirate", 6);
        assert!(description.contains("khaki explorer's vest"));
    }

    #[test]
    fn test_learning_concept_defaults() {
        assert_eq!(default_learning_concept("Physics"), "How forces and energy work in our world");
        assert_eq!(default_learning_concept("art"), "How science helps us understand the world");
    }

    #[test]
    fn test_setting_defaults() {
        assert!(default_setting("sci-fi").contains("flying cars"));
        assert!(default_setting("western").contains("hidden treasures"));
    }

    #[test]
    fn test_pronoun_forms() {
        assert_eq!(Pronouns::She.triple(), "she/her/her");
        assert_eq!(Pronouns::It.possessive(), "its");
        assert_eq!("HE".parse::<Pronouns>(), Ok(Pronouns::He));
        assert_eq!("xe".parse::<Pronouns>(), Ok(Pronouns::They));
        assert_eq!(Pronouns::default().triple(), "they/them/their");
    }

    #[test]
    fn test_reference_for_child() {
        let reference = CharacterReference::for_child("Mia", "Space Astronaut", ImagePayload::new("image/jpeg", "eA=="));
        assert_eq!(reference.description, "Mia the Space Astronaut");
    }
}
