//! Flavor Data Preparation Pipeline Library
//!
//! Turns the raw merged recipe/dessert dataset into the model-ready inputs
//! of the flavor-pairing recommender, built with Rust and Polars.
//!
//! # Overview
//!
//! The pipeline runs four sequential stages over an in-memory table:
//!
//! - **Column Selection**: projection to the required columns, removal of
//!   rows with missing required values, fatal abort on schema mismatch
//! - **Flavor Normalization**: ordered substring replacement rules over the
//!   free-text flavor field, then split/dedup/sort into token lists
//! - **Vocabulary Extraction**: the sorted set of all flavor tokens,
//!   persisted as a versioned, fingerprinted schema artifact
//! - **Categorical Encoding**: fixed-width binary indicator columns, one per
//!   vocabulary token, in vocabulary order
//!
//! The same normalization and encoding implementations serve both the batch
//! training path and the live prediction path ([`encode_request`]), so the
//! two can never drift apart.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use flavor_prep::{Pipeline, PipelineConfig, UnknownTokenPolicy};
//! use polars::prelude::*;
//!
//! // Load the merged dataset
//! let df = CsvReadOptions::default()
//!     .with_has_header(true)
//!     .try_into_reader_with_file_path(Some("merged.csv".into()))?
//!     .finish()?;
//!
//! // Run the pipeline; artifacts land in the output directory
//! let config = PipelineConfig::builder()
//!     .output_dir("data/pipeline")
//!     .unknown_token_policy(UnknownTokenPolicy::Report)
//!     .build()?;
//!
//! let result = Pipeline::builder().config(config).build()?.process(df)?;
//! println!("{} records, {} flavor columns", result.summary.rows_after, result.vocabulary.len());
//!
//! // Later, in the web process: encode one user submission
//! use flavor_prep::{FlavorVocabulary, encode_request};
//!
//! let vocabulary = FlavorVocabulary::load("data/pipeline/flavors.json".as_ref())?;
//! let row = encode_request(&["earl", "vanilla"], &vocabulary, UnknownTokenPolicy::Report)
//!     .into_row(&vocabulary)?;
//! ```
//!
//! # Configuration
//!
//! Use [`PipelineConfig`] to override the required columns, flavor column,
//! artifact locations and the unknown-token policy:
//!
//! ```rust,ignore
//! use flavor_prep::config::*;
//!
//! let config = PipelineConfig::builder()
//!     .required_columns(["recipe_name", "aggregateRating", "flavors"])
//!     .flavor_column("flavors")
//!     .output_dir("artifacts")
//!     .save_to_disk(false)
//!     .build()?;
//! ```

pub mod cleaner;
pub mod config;
pub mod encoder;
pub mod error;
pub mod pipeline;
pub mod types;
pub mod utils;
pub mod vocabulary;

// Re-exports for convenient access
pub use cleaner::{ColumnSelector, FlavorNormalizer, REPLACEMENT_RULES, normalize_flavor_text};
pub use config::{
    ConfigValidationError, PipelineConfig, PipelineConfigBuilder, UnknownTokenPolicy,
};
pub use encoder::{EncodedRequest, EncodingReport, FlavorEncoder, encode_request};
pub use error::{PrepError, Result as PrepResult, ResultExt};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use types::{ActionType, PipelineResult, PrepAction, PrepSummary};
pub use vocabulary::FlavorVocabulary;
