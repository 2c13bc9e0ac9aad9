//! Batch plan files.
mod loader;
mod parse;
pub mod types;


pub use loader::load_plan;
pub use types::{DEFAULT_CONCURRENCY, DurationValue, PlanDefaults, PlanFile, PlanRequest};

pub(crate) use parse::parse_duration_value;
