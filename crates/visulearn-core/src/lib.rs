//! VisuLearn Core - building blocks for resilient generation batches.
//!
//! This crate provides:
//! - `RetryingCaller`: bounded exponential backoff for rate limited calls
//! - The batch data model (`GenerationUnit`, `BatchProgress`, `BatchSummary`)
//! - Plan reconciliation, prompt templates and tolerant JSON parsing
//! - Content planning for stories, comics and snap & learn
//! - Configuration and error handling
//!
//! # Example
//!
//! ```rust,no_run
//! use visulearn_core::{RetryPolicy, RetryingCaller};
//! use visulearn_abstraction::ProviderError;
//!
//! # async fn run() -> Result<(), ProviderError> {
//! let caller = RetryingCaller::new(RetryPolicy::default());
//! let text = caller.call(|| async { Ok::<_, ProviderError>("ok".to_string()) }).await?;
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod config;
pub mod content;
pub mod error;
pub mod parsing;
pub mod prompts;
pub mod retry;

pub use batch::{
    BatchProgress, BatchResult, BatchState, BatchSummary, GenerationUnit, SubTask, SubTaskFailure,
    UnitDescriptor, UnitKind, format_duration, reconcile_units,
};
pub use config::{Credentials, VisuLearnConfig};
pub use content::{
    CharacterReference, ComicPlan, ComicRequest, ImageAnalysis, Pronouns, SnapLearnRequest,
    StoryRequest,
};
pub use error::{Result, VisuLearnError};
pub use parsing::{ParseError, parse_structured};
pub use prompts::{CHARACTER_SLOT, PromptTemplate};
pub use retry::{CallOutcome, CallReport, RetryPolicy, RetryingCaller};
