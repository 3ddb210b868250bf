//! Sequential processing of generation units.

use crate::progress::ProgressReporter;
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, info, info_span, warn};
use visulearn_abstraction::{Asset, Classify, ImageModel, ImageRequest, ProviderError, SpeechModel};
use visulearn_core::{
    BatchProgress, BatchResult, BatchSummary, CallReport, CharacterReference, GenerationUnit,
    RetryingCaller, SubTask, SubTaskFailure, UnitDescriptor, UnitKind,
};
use visulearn_models::ProviderSet;

/// Drives a batch of units one at a time.
///
/// Every sub-task goes through the [`RetryingCaller`]. A sub-task that still
/// fails is recorded on its unit and the batch moves on; progress advances
/// once per unit no matter how its sub-tasks ended.
pub struct SequentialBatchOrchestrator {
    caller: RetryingCaller,
    image: Arc<dyn ImageModel>,
    speech: Arc<dyn SpeechModel>,
    reporter: Arc<ProgressReporter>,
}

impl SequentialBatchOrchestrator {
    /// Create an orchestrator over the given providers.
    pub fn new(caller: RetryingCaller, image: Arc<dyn ImageModel>, speech: Arc<dyn SpeechModel>) -> Self {
        Self { caller, image, speech, reporter: Arc::new(ProgressReporter::new()) }
    }

    /// Create an orchestrator over the image and speech providers of a set.
    pub fn from_providers(caller: RetryingCaller, providers: &ProviderSet) -> Self {
        Self::new(caller, Arc::clone(&providers.image), Arc::clone(&providers.speech))
    }

    /// Publish progress through an existing reporter.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// The reporter progress is published to.
    pub fn reporter(&self) -> &Arc<ProgressReporter> {
        &self.reporter
    }

    /// Processes `descriptors` in order and returns every unit with its results.
    ///
    /// With a `character`, its description fills the character slot of each
    /// image prompt and its image is sent as the reference; without one the
    /// prompts are sent as written.
    pub async fn run(
        &self,
        kind: UnitKind,
        descriptors: Vec<UnitDescriptor>,
        character: Option<&CharacterReference>,
    ) -> BatchResult {
        let started = Instant::now();
        let mut progress = BatchProgress::new(descriptors.len());

        info!(
            kind = ?kind,
            total_units = descriptors.len(),
            has_character = character.is_some(),
            "Starting batch"
        );
        progress.start();
        self.reporter.emit_batch_started(kind, progress);

        let mut units = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let mut unit = GenerationUnit::from_descriptor(kind, descriptor);
            self.process_unit(&mut unit, character).await;

            progress.advance();
            self.reporter.emit_unit_completed(unit.id, progress, unit.failures.len());
            units.push(unit);
        }

        let summary = BatchSummary::from_units(&units, started.elapsed());
        info!(
            total_units = summary.total_units,
            units_with_image = summary.units_with_image,
            units_with_audio = summary.units_with_audio,
            failed_sub_tasks = summary.failed_sub_tasks,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Batch completed"
        );
        self.reporter.emit_batch_completed(summary.clone());

        BatchResult { units, summary }
    }

    async fn process_unit(&self, unit: &mut GenerationUnit, character: Option<&CharacterReference>) {
        for &sub_task in unit.kind.sub_tasks() {
            let span = info_span!("sub_task", unit_id = unit.id, sub_task = %sub_task);
            let report = match sub_task {
                SubTask::Image => self.generate_image(unit, character).instrument(span).await,
                SubTask::Audio => self.narrate(unit).instrument(span).await,
            };

            match report.result {
                Ok(asset) => unit.set_result(sub_task, asset),
                Err(err) => {
                    warn!(
                        unit_id = unit.id,
                        sub_task = %sub_task,
                        attempts = report.attempts,
                        kind = %err.failure_kind(),
                        error = %err,
                        "Sub-task failed, continuing without its result"
                    );
                    unit.record_failure(SubTaskFailure {
                        sub_task,
                        kind: err.failure_kind(),
                        message: err.to_string(),
                        attempts: report.attempts,
                    });
                }
            }
        }
    }

    async fn generate_image(
        &self,
        unit: &GenerationUnit,
        character: Option<&CharacterReference>,
    ) -> CallReport<Asset, ProviderError> {
        let prompt = unit.image_prompt.render(character.map(|c| c.description.as_str()));
        let request = ImageRequest::new(prompt).with_reference(character.map(|c| c.image.clone()));
        let request = &request;
        let image = &self.image;

        self.caller
            .call_counted(move || async move { image.generate_image(request).await.map(Asset::Image) })
            .await
    }

    async fn narrate(&self, unit: &GenerationUnit) -> CallReport<Asset, ProviderError> {
        let text = unit.source_text.as_str();
        let speech = &self.speech;

        self.caller
            .call_counted(move || async move { speech.synthesize(text).await.map(Asset::Audio) })
            .await
    }
}
