//! Data types for generation batches.

use crate::prompts::PromptTemplate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use visulearn_abstraction::{Asset, FailureKind};

/// What a unit is part of; decides which sub-tasks it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// A narrated story segment.
    Story,
    /// A comic panel.
    Comic,
    /// A snap & learn explanation of an uploaded photo.
    Explanation,
}

impl UnitKind {
    /// The sub-tasks a unit of this kind runs, in order.
    pub const fn sub_tasks(self) -> &'static [SubTask] {
        match self {
            Self::Story | Self::Explanation => &[SubTask::Image, SubTask::Audio],
            Self::Comic => &[SubTask::Image],
        }
    }
}

/// One external call made for a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubTask {
    /// Image generation or enhancement.
    Image,
    /// Narration.
    Audio,
}

impl SubTask {
    /// Stable name used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
        }
    }
}

impl fmt::Display for SubTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sub-task that failed terminally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubTaskFailure {
    /// Which sub-task failed.
    pub sub_task: SubTask,
    /// Classification of the last error.
    pub kind: FailureKind,
    /// Message of the last error.
    pub message: String,
    /// Attempts made before giving up.
    pub attempts: u32,
}

/// A planned unit as returned by the content planning call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDescriptor {
    /// 1-based position.
    pub id: u32,
    /// Narration or caption.
    pub text: String,
    /// Image prompt, possibly with a character slot.
    pub image_prompt: PromptTemplate,
}

impl UnitDescriptor {
    /// Create a descriptor.
    pub fn new(id: u32, text: impl Into<String>, image_prompt: impl Into<PromptTemplate>) -> Self {
        Self { id, text: text.into(), image_prompt: image_prompt.into() }
    }
}

/// A unit of work in a batch: one story segment, comic panel or explanation.
///
/// Units are never dropped because a sub-task failed; a missing result is
/// recorded as `None` plus an entry in `failures`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationUnit {
    /// 1-based position, unique within the batch.
    pub id: u32,
    /// What the unit is part of.
    pub kind: UnitKind,
    /// Narration or caption.
    pub source_text: String,
    /// Image prompt template.
    pub image_prompt: PromptTemplate,
    /// Generated image, if the image sub-task succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_result: Option<Asset>,
    /// Narration, if the audio sub-task succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_result: Option<Asset>,
    /// Terminal sub-task failures.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<SubTaskFailure>,
}

impl GenerationUnit {
    /// Create a unit with no results yet.
    pub fn new(id: u32, kind: UnitKind, source_text: impl Into<String>, image_prompt: impl Into<PromptTemplate>) -> Self {
        Self {
            id,
            kind,
            source_text: source_text.into(),
            image_prompt: image_prompt.into(),
            image_result: None,
            audio_result: None,
            failures: Vec::new(),
        }
    }

    /// Create a unit from a planned descriptor.
    pub fn from_descriptor(kind: UnitKind, descriptor: UnitDescriptor) -> Self {
        Self::new(descriptor.id, kind, descriptor.text, descriptor.image_prompt)
    }

    /// Returns true if an image is attached.
    pub const fn has_image(&self) -> bool {
        self.image_result.is_some()
    }

    /// Returns true if narration is attached.
    pub const fn has_audio(&self) -> bool {
        self.audio_result.is_some()
    }

    /// Stores the result of a sub-task.
    pub fn set_result(&mut self, sub_task: SubTask, asset: Asset) {
        match sub_task {
            SubTask::Image => self.image_result = Some(asset),
            SubTask::Audio => self.audio_result = Some(asset),
        }
    }

    /// Records a terminal sub-task failure.
    pub fn record_failure(&mut self, failure: SubTaskFailure) {
        self.failures.push(failure);
    }

    /// Returns true if every required sub-task produced a result.
    pub fn is_complete(&self) -> bool {
        self.kind.sub_tasks().iter().all(|sub_task| match sub_task {
            SubTask::Image => self.has_image(),
            SubTask::Audio => self.has_audio(),
        })
    }
}

/// Counts describing a finished batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Number of units processed.
    pub total_units: usize,
    /// Units with an image attached.
    pub units_with_image: usize,
    /// Units with narration attached.
    pub units_with_audio: usize,
    /// Recorded sub-task failures across all units.
    pub failed_sub_tasks: usize,
    /// Wall time from start to finish.
    pub elapsed: Duration,
}

impl BatchSummary {
    /// Summarizes a list of processed units.
    pub fn from_units(units: &[GenerationUnit], elapsed: Duration) -> Self {
        Self {
            total_units: units.len(),
            units_with_image: units.iter().filter(|u| u.has_image()).count(),
            units_with_audio: units.iter().filter(|u| u.has_audio()).count(),
            failed_sub_tasks: units.iter().map(|u| u.failures.len()).sum(),
            elapsed,
        }
    }

    /// Check if no sub-task failed.
    pub const fn is_complete_success(&self) -> bool {
        self.failed_sub_tasks == 0
    }
}

/// Everything a batch produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Units in their original order.
    pub units: Vec<GenerationUnit>,
    /// Counts over `units`.
    pub summary: BatchSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use visulearn_abstraction::{AudioPayload, ImagePayload};

    fn image() -> Asset {
        Asset::Image(ImagePayload::new("image/png", "aGVsbG8="))
    }

    fn audio() -> Asset {
        Asset::Audio(AudioPayload::new("audio/mpeg", b"ID3".to_vec()))
    }

    #[test]
    fn test_sub_tasks_per_kind() {
        assert_eq!(UnitKind::Story.sub_tasks(), &[SubTask::Image, SubTask::Audio]);
        assert_eq!(UnitKind::Explanation.sub_tasks(), &[SubTask::Image, SubTask::Audio]);
        assert_eq!(UnitKind::Comic.sub_tasks(), &[SubTask::Image]);
    }

    #[test]
    fn test_unit_completion() {
        let mut unit = GenerationUnit::new(1, UnitKind::Story, "Once", "[CHARACTER] smiles");
        assert!(!unit.is_complete());

        unit.set_result(SubTask::Image, image());
        assert!(!unit.is_complete());
        unit.set_result(SubTask::Audio, audio());
        assert!(unit.is_complete());

        let mut panel = GenerationUnit::new(1, UnitKind::Comic, "POW!", "hero");
        panel.set_result(SubTask::Image, image());
        assert!(panel.is_complete());
    }

    #[test]
    fn test_summary_counts() {
        let mut first = GenerationUnit::new(1, UnitKind::Story, "a", "a");
        first.set_result(SubTask::Image, image());
        first.set_result(SubTask::Audio, audio());

        let mut second = GenerationUnit::new(2, UnitKind::Story, "b", "b");
        second.set_result(SubTask::Audio, audio());
        second.record_failure(SubTaskFailure {
            sub_task: SubTask::Image,
            kind: FailureKind::Provider,
            message: "500".to_string(),
            attempts: 1,
        });

        let summary = BatchSummary::from_units(&[first, second], Duration::from_secs(3));
        assert_eq!(summary.total_units, 2);
        assert_eq!(summary.units_with_image, 1);
        assert_eq!(summary.units_with_audio, 2);
        assert_eq!(summary.failed_sub_tasks, 1);
        assert!(!summary.is_complete_success());
    }

    #[test]
    fn test_unit_serialization_skips_empty_results() {
        let unit = GenerationUnit::new(3, UnitKind::Comic, "ZAP!", "[CHARACTER] flies");
        let json = serde_json::to_value(&unit).unwrap();
        assert_eq!(json["kind"], "comic");
        assert_eq!(json["image_prompt"], "[CHARACTER] flies");
        assert!(json.get("image_result").is_none());
        assert!(json.get("failures").is_none());
    }
}
