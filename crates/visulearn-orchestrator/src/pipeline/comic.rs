use super::PipelineCore;
use crate::progress::ProgressReporter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use visulearn_core::{BatchResult, ComicRequest, Result, RetryPolicy, UnitKind};
use visulearn_models::ProviderSet;

/// A generated comic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComicOutput {
    /// Comic title.
    pub title: String,
    /// One-line description.
    pub description: String,
    /// Panels with their illustrations.
    pub batch: BatchResult,
}

/// Plans a comic and draws every panel.
pub struct ComicPipeline {
    core: PipelineCore,
}

impl ComicPipeline {
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

    /// Generates the comic with exactly `request.panels` panels.
    ///
    /// # Errors
    /// Returns an error if the request is invalid, the planning call fails or
    /// its response holds no panels.
    pub async fn run(&self, request: &ComicRequest) -> Result<ComicOutput> {
        request.validate()?;
        info!(
            comic_type = %request.comic_type,
            subject = %request.subject,
            panels = request.panels,
            "Planning comic"
        );

        let raw = self.core.plan(&request.planning_prompt(), None).await?;
        let plan = request.parse_plan(&raw)?;

        let character = request.character_reference();
        let batch = self.core.orchestrator.run(UnitKind::Comic, plan.panels, character.as_ref()).await;
        Ok(ComicOutput { title: plan.title, description: plan.description, batch })
    }
}
