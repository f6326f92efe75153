//! Custom error types for the flavor data preparation pipeline.
//!
//! This module provides the error hierarchy using `thiserror`. Schema
//! violations are fatal and abort the run; missing values and unknown
//! tokens are handled locally by the stages and never surface here.

use thiserror::Error;

/// The main error type for the preparation pipeline.
#[derive(Error, Debug)]
pub enum PrepError {
    /// Required columns are absent from the input table.
    #[error("required columns missing from the input table: {missing:?}")]
    SchemaMismatch { missing: Vec<String> },

    /// Column was not found in the dataset.
    #[error("column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// The persisted vocabulary no longer matches its own fingerprint, or
    /// the caller expected a different schema version.
    #[error("vocabulary schema skew: expected fingerprint {expected}, found {actual}")]
    SchemaSkew { expected: String, actual: String },

    /// Extraction produced no tokens; a zero-width encoding cannot feed the model.
    #[error("no flavor tokens found in column '{0}'")]
    EmptyVocabulary(String),

    /// Invalid configuration provided.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PrepError>,
    },
}

impl PrepError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PrepError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Whether this error indicates a structural mismatch between the
    /// configuration and the data (never retried, never recovered).
    pub fn is_schema_violation(&self) -> bool {
        match self {
            Self::SchemaMismatch { .. } | Self::SchemaSkew { .. } => true,
            Self::WithContext { source, .. } => source.is_schema_violation(),
            _ => false,
        }
    }
}

impl From<crate::config::ConfigValidationError> for PrepError {
    fn from(err: crate::config::ConfigValidationError) -> Self {
        PrepError::InvalidConfig(err.to_string())
    }
}

/// Result type alias for preparation operations.
pub type Result<T> = std::result::Result<T, PrepError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PrepError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PrepError::Io(e).with_context(context))
    }
}
