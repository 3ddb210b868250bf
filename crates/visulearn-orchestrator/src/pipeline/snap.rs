use super::PipelineCore;
use crate::progress::ProgressReporter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use visulearn_core::{BatchResult, ImageAnalysis, Result, RetryPolicy, SnapLearnRequest, UnitKind};
use visulearn_models::ProviderSet;

/// An explained photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapLearnOutput {
    /// The concept found and the edits drawn on the photo.
    pub analysis: ImageAnalysis,
    /// The single explanation unit: annotated photo plus narration.
    pub batch: BatchResult,
}

/// Finds a concept in a photo, annotates the photo and narrates the concept.
pub struct SnapLearnPipeline {
    core: PipelineCore,
}

impl SnapLearnPipeline {
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

    /// Explains the photo.
    ///
    /// # Errors
    /// Returns an error if the analysis call fails or returns nothing.
    pub async fn run(&self, request: &SnapLearnRequest) -> Result<SnapLearnOutput> {
        info!(
            subject = %request.subject,
            previous_concepts = request.previous_concepts.len(),
            "Analyzing photo"
        );

        let raw = self.core.plan(&request.analysis_prompt(), Some(&request.photo)).await?;
        let analysis = request.parse_analysis(&raw)?;
        info!(concept = %analysis.concept.name, "Found concept");

        let unit = request.explanation_unit(&analysis);
        let reference = request.photo_reference(&analysis);
        let batch = self.core.orchestrator.run(UnitKind::Explanation, vec![unit], Some(&reference)).await;
        Ok(SnapLearnOutput { analysis, batch })
    }
}
