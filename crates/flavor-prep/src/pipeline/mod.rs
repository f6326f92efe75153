//! Pipeline module.
//!
//! Provides the main preparation pipeline and its builder.

mod builder;

pub use builder::{Pipeline, PipelineBuilder};
