//! Configuration types for the flavor data preparation pipeline.
//!
//! The configuration is an explicit value constructed once at process start
//! and passed into the pipeline; no stage reads ambient global state. Use
//! the builder for flexible setup.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How the encoder treats a record token that is absent from the vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum UnknownTokenPolicy {
    /// Omit the token from the encoding without reporting it.
    #[default]
    Drop,
    /// Omit the token, count it, and surface the count in logs and the run
    /// summary. Never fatal.
    Report,
}

/// Configuration for the preparation pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration with a
/// fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use flavor_prep::config::{PipelineConfig, UnknownTokenPolicy};
///
/// let config = PipelineConfig::builder()
///     .required_columns(["recipe_name", "aggregateRating", "flavors"])
///     .unknown_token_policy(UnknownTokenPolicy::Report)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Columns that must be present in the raw table, in output order.
    /// Rows with a missing value in any of them are removed.
    pub required_columns: Vec<String>,

    /// Name of the free-text flavor column. Must be one of the required
    /// columns.
    pub flavor_column: String,

    /// Output directory for the cleaned table, vocabulary and encoded table.
    /// Default: "output"
    pub output_dir: PathBuf,

    /// File name for the cleaned table (post selection + normalization).
    /// Default: "clean.csv"
    pub clean_file_name: String,

    /// File name for the vocabulary artifact.
    /// Default: "flavors.json"
    pub vocabulary_file_name: String,

    /// File name for the encoded table consumed by model fitting.
    /// Default: "final.csv"
    pub encoded_file_name: String,

    /// How to treat record tokens absent from the vocabulary.
    /// Default: Drop (matches the historical behavior)
    pub unknown_token_policy: UnknownTokenPolicy,

    /// Whether to persist the artifacts to disk at the end of the run.
    /// When false, results are kept in memory only.
    /// Default: true
    pub save_to_disk: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            required_columns: default_required_columns(),
            flavor_column: "flavors".to_string(),
            output_dir: PathBuf::from("output"),
            clean_file_name: "clean.csv".to_string(),
            vocabulary_file_name: "flavors.json".to_string(),
            encoded_file_name: "final.csv".to_string(),
            unknown_token_policy: UnknownTokenPolicy::default(),
            save_to_disk: true,
        }
    }
}

/// The columns the model and recommender need from the merged dataset.
fn default_required_columns() -> Vec<String> {
    [
        "recipe_name",
        "aggregateRating",
        "flavors",
        "willMakeAgainPct",
        "reviewsCount",
        "url",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.required_columns.is_empty() {
            return Err(ConfigValidationError::NoRequiredColumns);
        }

        if !self.required_columns.contains(&self.flavor_column) {
            return Err(ConfigValidationError::FlavorColumnNotRequired(
                self.flavor_column.clone(),
            ));
        }

        for (field, name) in [
            ("clean_file_name", &self.clean_file_name),
            ("vocabulary_file_name", &self.vocabulary_file_name),
            ("encoded_file_name", &self.encoded_file_name),
        ] {
            if name.trim().is_empty() {
                return Err(ConfigValidationError::EmptyFileName {
                    field: field.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("required_columns must not be empty")]
    NoRequiredColumns,

    #[error("flavor column '{0}' is not in the required column set")]
    FlavorColumnNotRequired(String),

    #[error("'{field}' must not be empty")]
    EmptyFileName { field: String },
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    required_columns: Option<Vec<String>>,
    flavor_column: Option<String>,
    output_dir: Option<PathBuf>,
    clean_file_name: Option<String>,
    vocabulary_file_name: Option<String>,
    encoded_file_name: Option<String>,
    unknown_token_policy: Option<UnknownTokenPolicy>,
    save_to_disk: Option<bool>,
}

impl PipelineConfigBuilder {
    /// Set the required columns, in the order they should appear in the
    /// cleaned table.
    pub fn required_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the name of the free-text flavor column.
    pub fn flavor_column(mut self, column: impl Into<String>) -> Self {
        self.flavor_column = Some(column.into());
        self
    }

    /// Set the output directory for the generated artifacts.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set the cleaned-table file name.
    pub fn clean_file_name(mut self, name: impl Into<String>) -> Self {
        self.clean_file_name = Some(name.into());
        self
    }

    /// Set the vocabulary artifact file name.
    pub fn vocabulary_file_name(mut self, name: impl Into<String>) -> Self {
        self.vocabulary_file_name = Some(name.into());
        self
    }

    /// Set the encoded-table file name.
    pub fn encoded_file_name(mut self, name: impl Into<String>) -> Self {
        self.encoded_file_name = Some(name.into());
        self
    }

    /// Set the unknown-token policy used at encoding time.
    pub fn unknown_token_policy(mut self, policy: UnknownTokenPolicy) -> Self {
        self.unknown_token_policy = Some(policy);
        self
    }

    /// Enable or disable persisting artifacts to disk.
    pub fn save_to_disk(mut self, save: bool) -> Self {
        self.save_to_disk = Some(save);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let config = PipelineConfig {
            required_columns: self.required_columns.unwrap_or_else(default_required_columns),
            flavor_column: self.flavor_column.unwrap_or_else(|| "flavors".to_string()),
            output_dir: self.output_dir.unwrap_or_else(|| PathBuf::from("output")),
            clean_file_name: self.clean_file_name.unwrap_or_else(|| "clean.csv".to_string()),
            vocabulary_file_name: self
                .vocabulary_file_name
                .unwrap_or_else(|| "flavors.json".to_string()),
            encoded_file_name: self
                .encoded_file_name
                .unwrap_or_else(|| "final.csv".to_string()),
            unknown_token_policy: self.unknown_token_policy.unwrap_or_default(),
            save_to_disk: self.save_to_disk.unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }
}
