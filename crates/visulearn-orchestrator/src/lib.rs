//! Batch orchestration for VisuLearn.
//!
//! Runs generation units through image and speech providers one at a time,
//! reporting progress as it goes, and wires content planning in front of it
//! for stories, comics and snap & learn.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use visulearn_core::{RetryPolicy, StoryRequest};
//! use visulearn_models::{MockModel, ProviderSet};
//! use visulearn_orchestrator::StoryPipeline;
//!
//! # async fn run(request: StoryRequest) -> visulearn_core::Result<()> {
//! let providers = ProviderSet::from_mock(Arc::new(MockModel::new("mock")));
//! let pipeline = StoryPipeline::new(&providers, RetryPolicy::default());
//! let mut events = pipeline.reporter().subscribe();
//! tokio::spawn(async move {
//!     while let Ok(event) = events.recv().await {
//!         println!("{:?}", event);
//!     }
//! });
//! let output = pipeline.run(&request).await?;
//! println!("{} segments", output.batch.units.len());
//! # Ok(())
//! # }
//! ```

pub mod orchestrator;
pub mod pipeline;
pub mod progress;

pub use orchestrator::SequentialBatchOrchestrator;
pub use pipeline::{
    ComicOutput, ComicPipeline, SnapLearnOutput, SnapLearnPipeline, StoryOutput, StoryPipeline,
};
pub use progress::{ProgressEvent, ProgressReporter};
