//! Snap & learn: explain one concept visible in a photo.

use crate::batch::UnitDescriptor;
use crate::content::character::CharacterReference;
use crate::error::{Result, VisuLearnError};
use crate::parsing::{ParseError, parse_structured};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use tracing::warn;
use visulearn_abstraction::ImagePayload;

/// A photo to explain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapLearnRequest {
    /// The uploaded photo.
    pub photo: ImagePayload,
    /// School subject to find a concept from.
    pub subject: String,
    /// Concepts already explained for this photo; they must not come back.
    #[serde(default)]
    pub previous_concepts: Vec<String>,
}

/// The concept found in the photo.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Concept {
    /// Short name, e.g. "Light and Shadows".
    #[serde(default)]
    pub name: String,
    /// Two or three child-friendly sentences.
    #[serde(default)]
    pub explanation: String,
}

/// An arrow to draw on the photo.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Arrow {
    /// e.g. "from light source toward object".
    pub direction: String,
    /// Where to draw it.
    pub position: String,
    /// Arrow color.
    pub color: String,
    /// What it shows.
    pub purpose: String,
}

/// An area to highlight on the photo.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Highlight {
    /// What to highlight.
    pub area: String,
    /// Highlight color.
    pub color: String,
    /// circle, rectangle or outline.
    pub style: String,
    /// Why.
    pub purpose: String,
}

/// A text label to add to the photo.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Label {
    /// One or two words.
    pub text: String,
    /// Where to place it.
    pub position: String,
    /// Text color.
    pub color: String,
    /// What it explains.
    pub purpose: String,
}

/// Annotations that make the concept visible.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualEdits {
    /// Arrows to draw.
    pub arrows: Vec<Arrow>,
    /// Areas to highlight.
    pub highlights: Vec<Highlight>,
    /// Labels to add.
    pub labels: Vec<Label>,
}

impl VisualEdits {
    /// Returns true when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.arrows.is_empty() && self.highlights.is_empty() && self.labels.is_empty()
    }
}

/// What the content model saw in the photo.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageAnalysis {
    /// The concept to teach.
    #[serde(default)]
    pub concept: Concept,
    /// How to annotate the photo.
    #[serde(default)]
    pub visual_edits: VisualEdits,
}

impl ImageAnalysis {
    /// Prompt for the image model to annotate the photo.
    pub fn enhancement_prompt(&self) -> String {
        let edits = &self.visual_edits;
        let mut prompt = String::from(
            "Enhance this educational image by adding the following visual elements to help explain the concept:\n\n",
        );

        if !edits.arrows.is_empty() {
            prompt.push_str("ARROWS TO ADD:\n");
            for (index, arrow) in edits.arrows.iter().enumerate() {
                let _ = writeln!(
                    prompt,
                    "{}. Draw a {} arrow {} {} to {}",
                    index + 1,
                    arrow.color,
                    arrow.direction,
                    arrow.position,
                    arrow.purpose
                );
            }
            prompt.push('\n');
        }

        if !edits.highlights.is_empty() {
            prompt.push_str("AREAS TO HIGHLIGHT:\n");
            for (index, highlight) in edits.highlights.iter().enumerate() {
                let _ = writeln!(
                    prompt,
                    "{}. Add a {} {} highlight around {} to {}",
                    index + 1,
                    highlight.color,
                    highlight.style,
                    highlight.area,
                    highlight.purpose
                );
            }
            prompt.push('\n');
        }

        if !edits.labels.is_empty() {
            prompt.push_str("LABELS TO ADD:\n");
            for (index, label) in edits.labels.iter().enumerate() {
                let _ = writeln!(
                    prompt,
                    "{}. Add {} text \"{}\" {} to {}",
                    index + 1,
                    label.color,
                    label.text,
                    label.position,
                    label.purpose
                );
            }
            prompt.push('\n');
        }

        prompt.push_str(
            "Make sure all additions are clear, educational, and kid-friendly. \
             Keep the original image intact while adding these visual enhancements.",
        );
        prompt
    }

    /// Returns true if the concept matches one already explained, ignoring case.
    pub fn repeats(&self, previous: &[String]) -> bool {
        let name = self.concept.name.trim().to_lowercase();
        previous.iter().any(|p| p.trim().to_lowercase() == name)
    }
}

impl SnapLearnRequest {
    /// Prompt for the analysis call; the photo is sent alongside it.
    pub fn analysis_prompt(&self) -> String {
        let subject = &self.subject;
        let mut prompt = format!(
            "You are an expert {subject} teacher for children aged 7-12. Look at the attached image and \
             identify ONE {subject} concept that can clearly be seen or demonstrated in it.\n\n\
             Respond in this JSON format:\n\
             {{\"concept\": {{\"name\": \"...\", \"explanation\": \"2-3 exciting sentences a child understands\"}}, \
             \"visual_edits\": {{\
             \"arrows\": [{{\"direction\": \"...\", \"position\": \"...\", \"color\": \"red|blue|green|yellow|purple\", \"purpose\": \"...\"}}], \
             \"highlights\": [{{\"area\": \"...\", \"color\": \"...\", \"style\": \"circle|rectangle|outline\", \"purpose\": \"...\"}}], \
             \"labels\": [{{\"text\": \"1-2 words\", \"position\": \"...\", \"color\": \"...\", \"purpose\": \"...\"}}]}}}}\n\n\
             Pick a concept that is actually visible, keep the language simple, and use bright, \
             kid-friendly colors. If no clear {subject} concept is visible, choose the closest related \
             one and explain the connection.\n"
        );

        if !self.previous_concepts.is_empty() {
            prompt.push_str("\nCONCEPTS ALREADY EXPLAINED:\n");
            for (index, concept) in self.previous_concepts.iter().enumerate() {
                let _ = writeln!(prompt, "{}. {}", index + 1, concept);
            }
            let _ = writeln!(
                prompt,
                "\nDo NOT repeat any of these. Find a DIFFERENT {} concept in the same image.",
                subject
            );
        }

        prompt.push_str("\nRespond with the JSON only.");
        prompt
    }

    /// Parses the analysis response.
    ///
    /// Text that holds no usable JSON becomes the explanation of a generic
    /// concept with no visual edits.
    ///
    /// # Errors
    /// Returns `VisuLearnError::Precondition` if the response is empty.
    pub fn parse_analysis(&self, raw: &str) -> Result<ImageAnalysis> {
        let analysis = match parse_structured::<ImageAnalysis>(raw) {
            Ok(analysis) if !analysis.concept.explanation.trim().is_empty() => analysis,
            Ok(_) | Err(ParseError::NoJson | ParseError::Invalid(_)) => {
                warn!("Analysis response had no usable JSON, using raw text as the explanation");
                ImageAnalysis {
                    concept: Concept { name: "Analysis Result".to_string(), explanation: raw.trim().to_string() },
                    visual_edits: VisualEdits::default(),
                }
            }
            Err(ParseError::Empty) => {
                return Err(VisuLearnError::Precondition("image analysis is empty".to_string()));
            }
        };

        if analysis.repeats(&self.previous_concepts) {
            warn!(concept = %analysis.concept.name, "Analysis repeated a concept that was already explained");
        }
        Ok(analysis)
    }

    /// The single explanation unit: annotate the photo, narrate the explanation.
    pub fn explanation_unit(&self, analysis: &ImageAnalysis) -> UnitDescriptor {
        UnitDescriptor::new(1, analysis.concept.explanation.clone(), analysis.enhancement_prompt())
    }

    /// Reference that sends the photo with the enhancement request.
    pub fn photo_reference(&self, analysis: &ImageAnalysis) -> CharacterReference {
        CharacterReference::new(analysis.concept.name.clone(), self.photo.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(previous: &[&str]) -> SnapLearnRequest {
        SnapLearnRequest {
            photo: ImagePayload::new("image/jpeg", "aGVsbG8="),
            subject: "physics".to_string(),
            previous_concepts: previous.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    const ANALYSIS: &str = r#"Here you go:
    {
      "concept": {"name": "Light and Shadows", "explanation": "Light travels in straight lines!"},
      "visual_edits": {
        "arrows": [{"direction": "from light source toward object", "position": "between lamp and object", "color": "yellow", "purpose": "shows light direction"}],
        "highlights": [{"area": "the shadow area", "color": "blue", "style": "outline", "purpose": "shows where light cannot reach"}],
        "labels": [{"text": "Shadow", "position": "in the dark area", "color": "white", "purpose": "identifies the shadow"}]
      }
    }"#;

    #[test]
    fn test_parse_analysis() {
        let analysis = request(&[]).parse_analysis(ANALYSIS).unwrap();
        assert_eq!(analysis.concept.name, "Light and Shadows");
        assert_eq!(analysis.visual_edits.arrows.len(), 1);
        assert_eq!(analysis.visual_edits.labels[0].text, "Shadow");
    }

    #[test]
    fn test_enhancement_prompt_sections() {
        let analysis = request(&[]).parse_analysis(ANALYSIS).unwrap();
        let prompt = analysis.enhancement_prompt();
        assert!(prompt.contains(
            "ARROWS TO ADD:\n1. Draw a yellow arrow from light source toward object between lamp and object to shows light direction\n"
        ));
        assert!(prompt.contains("AREAS TO HIGHLIGHT:\n1. Add a blue outline highlight around the shadow area"));
        assert!(prompt.contains("LABELS TO ADD:\n1. Add white text \"Shadow\" in the dark area"));
        assert!(prompt.ends_with("adding these visual enhancements."));
    }

    #[test]
    fn test_enhancement_prompt_skips_empty_sections() {
        let prompt = ImageAnalysis::default().enhancement_prompt();
        assert!(!prompt.contains("ARROWS TO ADD"));
        assert!(!prompt.contains("LABELS TO ADD"));
    }

    #[test]
    fn test_plain_text_becomes_generic_concept() {
        let analysis = request(&[]).parse_analysis("The lamp makes a shadow on the wall.").unwrap();
        assert_eq!(analysis.concept.name, "Analysis Result");
        assert_eq!(analysis.concept.explanation, "The lamp makes a shadow on the wall.");
        assert!(analysis.visual_edits.is_empty());
    }

    #[test]
    fn test_empty_analysis_is_precondition_error() {
        assert!(matches!(request(&[]).parse_analysis("   "), Err(VisuLearnError::Precondition(_))));
    }

    #[test]
    fn test_previous_concepts_are_listed() {
        let prompt = request(&["Light and Shadows", "Reflection"]).analysis_prompt();
        assert!(prompt.contains("1. Light and Shadows\n2. Reflection\n"));
        assert!(prompt.contains("Do NOT repeat"));

        let prompt = request(&[]).analysis_prompt();
        assert!(!prompt.contains("Do NOT repeat"));
    }

    #[test]
    fn test_repeat_detection() {
        let analysis = request(&[]).parse_analysis(ANALYSIS).unwrap();
        assert!(analysis.repeats(&["light and shadows".to_string()]));
        assert!(!analysis.repeats(&["Gravity".to_string()]));
    }

    #[test]
    fn test_explanation_unit() {
        let req = request(&[]);
        let analysis = req.parse_analysis(ANALYSIS).unwrap();
        let unit = req.explanation_unit(&analysis);
        assert_eq!(unit.id, 1);
        assert_eq!(unit.text, "Light travels in straight lines!");
        assert!(!unit.image_prompt.has_character_slot());
        assert_eq!(req.photo_reference(&analysis).image, req.photo);
    }
}
