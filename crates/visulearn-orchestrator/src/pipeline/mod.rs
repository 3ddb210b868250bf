//! End-to-end generation requests.
//!
//! Each pipeline runs the content planning call, turns its text into a fixed
//! list of units and hands them to a [`SequentialBatchOrchestrator`]. Only a
//! failed plan aborts a request; unit failures end up in the batch result.

mod comic;
mod snap;
mod story;

pub use comic::{ComicOutput, ComicPipeline};
pub use snap::{SnapLearnOutput, SnapLearnPipeline};
pub use story::{StoryOutput, StoryPipeline};

use crate::orchestrator::SequentialBatchOrchestrator;
use crate::progress::ProgressReporter;
use std::sync::Arc;
use tracing::{Instrument, debug, info_span, warn};
use visulearn_abstraction::{Classify, ContentModel, ImagePayload};
use visulearn_core::{Result, RetryPolicy, RetryingCaller, VisuLearnError};
use visulearn_models::ProviderSet;

/// What every pipeline holds: the content provider and an orchestrator for
/// the image and speech providers.
struct PipelineCore {
    caller: RetryingCaller,
    content: Arc<dyn ContentModel>,
    orchestrator: SequentialBatchOrchestrator,
}

impl PipelineCore {
    fn new(providers: &ProviderSet, policy: RetryPolicy) -> Self {
        let caller = RetryingCaller::new(policy);
        Self {
            caller,
            content: Arc::clone(&providers.content),
            orchestrator: SequentialBatchOrchestrator::from_providers(caller, providers),
        }
    }

    fn with_reporter(mut self, reporter: Arc<ProgressReporter>) -> Self {
        self.orchestrator = self.orchestrator.with_reporter(reporter);
        self
    }

    /// Runs the content planning call with retries.
    ///
    /// A call that still fails after retries is a precondition failure: the
    /// batch cannot start without a plan.
    async fn plan(&self, prompt: &str, image: Option<&ImagePayload>) -> Result<String> {
        debug!(prompt_len = prompt.len(), with_image = image.is_some(), "Requesting content plan");
        let content = &self.content;
        let text = self
            .caller
            .call(move || async move { content.generate_content(prompt, image).await })
            .instrument(info_span!("content_plan", model = %self.content.model_id()))
            .await
            .map_err(|e| {
                warn!(kind = %e.failure_kind(), error = %e, "Content planning call failed");
                VisuLearnError::Precondition(format!("content planning call failed: {}", e))
            })?;
        Ok(text)
    }
}
