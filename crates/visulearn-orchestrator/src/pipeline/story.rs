use super::PipelineCore;
use crate::progress::ProgressReporter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use visulearn_core::{BatchResult, Result, RetryPolicy, StoryRequest, UnitKind};
use visulearn_models::ProviderSet;

/// A generated story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryOutput {
    /// Segments with their illustrations and narration.
    pub batch: BatchResult,
}

/// Plans a story and illustrates and narrates every segment.
pub struct StoryPipeline {
    core: PipelineCore,
}

impl StoryPipeline {
    /// Create a pipeline over the given providers.
    pub fn new(providers: &ProviderSet, policy: RetryPolicy) -> Self {
        Self { core: PipelineCore::new(providers, policy) }
    }

    /// Publish progress through an existing reporter.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<ProgressReporter>) -> Self {
        self.core = self.core.with_reporter(reporter);
        self
    }

    /// The reporter progress is published to.
    pub fn reporter(&self) -> &Arc<ProgressReporter> {
        self.core.orchestrator.reporter()
    }

    /// Generates the story.
    ///
    /// # Errors
    /// Returns an error if the request is invalid, the planning call fails or
    /// its response holds no usable segments. No segment is processed then.
    pub async fn run(&self, request: &StoryRequest) -> Result<StoryOutput> {
        request.validate()?;
        info!(
            story_type = %request.story_type,
            subject = %request.subject,
            segments = request.segment_count(),
            "Planning story"
        );

        let raw = self.core.plan(&request.planning_prompt(), None).await?;
        let segments = request.parse_plan(&raw)?;

        let character = request.character_reference();
        let batch = self.core.orchestrator.run(UnitKind::Story, segments, character.as_ref()).await;
        Ok(StoryOutput { batch })
    }
}
