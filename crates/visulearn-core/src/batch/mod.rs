//! Batch data model: units, progress and summaries.

pub mod progress;
pub mod reconcile;
pub mod types;

pub use progress::{BatchProgress, BatchState, format_duration};
pub use reconcile::reconcile_units;
pub use types::{
    BatchResult, BatchSummary, GenerationUnit, SubTask, SubTaskFailure, UnitDescriptor, UnitKind,
};
