//! Parsing structured model output.

pub mod structured;

pub use structured::{ParseError, parse_structured};
