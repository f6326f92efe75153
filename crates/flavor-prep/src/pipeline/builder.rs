//! Main preparation pipeline module.
//!
//! The `Pipeline` struct orchestrates the four stages (column selection,
//! flavor normalization, vocabulary extraction, categorical encoding) and
//! persists the artifacts once every stage has succeeded. File I/O happens
//! only at the end of the run, so a schema-mismatch abort leaves no partial
//! output behind.

use polars::prelude::*;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

use crate::cleaner::{ColumnSelector, FlavorNormalizer};
use crate::config::{PipelineConfig, UnknownTokenPolicy};
use crate::encoder::FlavorEncoder;
use crate::error::{Result, ResultExt};
use crate::types::{ActionType, PipelineResult, PrepAction, PrepSummary};
use crate::vocabulary::FlavorVocabulary;

/// The main preparation pipeline.
///
/// Use [`Pipeline::builder()`] to create a pipeline with custom
/// configuration.
///
/// # Example
///
/// ```rust,ignore
/// use flavor_prep::{Pipeline, PipelineConfig};
/// use polars::prelude::*;
///
/// let df = CsvReadOptions::default()
///     .with_has_header(true)
///     .try_into_reader_with_file_path(Some("merged.csv".into()))?
///     .finish()?;
///
/// let result = Pipeline::builder()
///     .config(PipelineConfig::builder().output_dir("artifacts").build()?)
///     .build()?
///     .process(df)?;
///
/// println!("Encoded {} records against {} flavor columns",
///     result.summary.rows_after, result.vocabulary.len());
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    selector: ColumnSelector,
    normalizer: FlavorNormalizer,
    encoder: FlavorEncoder,
}

// The pipeline is handed across threads by server hosts.
static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// The configuration this pipeline was built with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full preparation pipeline over the raw merged table.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PrepError::SchemaMismatch`] when a required column
    /// is absent from the input; no output is written in that case. Other
    /// errors may occur during encoding or persistence.
    pub fn process(&self, df: DataFrame) -> Result<PipelineResult> {
        let start_time = Instant::now();

        info!("Starting flavor preparation pipeline...");
        let mut summary = PrepSummary::new();
        summary.rows_before = df.height();
        summary.columns_before = df.width();

        // Stage 1: project to required columns, drop incomplete rows.
        info!("Stage 1: Selecting required columns...");
        let (df, actions) = self
            .selector
            .select_required(df, &self.config.required_columns)
            .context("during column selection")?;
        summary.rows_dropped = summary.rows_before - df.height();
        for action in actions {
            summary.add_action(action);
        }

        // Stage 2: normalize the flavor text into canonical token lists.
        info!("Stage 2: Normalizing flavor text...");
        let (cleaned, actions) = self
            .normalizer
            .normalize_column(df, &self.config.flavor_column)
            .context("during flavor normalization")?;
        for action in actions {
            summary.add_action(action);
        }

        // Stage 3: extract the canonical vocabulary.
        info!("Stage 3: Extracting the flavor vocabulary...");
        let vocabulary = FlavorVocabulary::extract(&cleaned, &self.config.flavor_column)
            .context("during vocabulary extraction")?;
        summary.vocabulary_size = vocabulary.len();
        summary.add_action(PrepAction::new(
            ActionType::VocabularyExtracted,
            &self.config.flavor_column,
            format!(
                "Extracted {} distinct flavor tokens (fingerprint {})",
                vocabulary.len(),
                vocabulary.fingerprint()
            ),
        ));

        // Stage 4: one-hot encode against the vocabulary.
        info!("Stage 4: One-hot encoding the flavor column...");
        let (encoded, report) = self
            .encoder
            .encode(
                cleaned.clone(),
                &vocabulary,
                &self.config.flavor_column,
                self.config.unknown_token_policy,
            )
            .context("during categorical encoding")?;

        if self.config.unknown_token_policy == UnknownTokenPolicy::Report
            && report.unknown_token_count > 0
        {
            summary.unknown_token_count = report.unknown_token_count;
            summary.unknown_tokens = report.unknown_tokens.clone();
            summary.add_action(PrepAction::new(
                ActionType::TokensDropped,
                &self.config.flavor_column,
                format!(
                    "Dropped {} occurrences of tokens absent from the vocabulary",
                    report.unknown_token_count
                ),
            ));
        }

        summary.rows_after = encoded.height();
        summary.columns_after = encoded.width();

        // Persist only after every stage has succeeded.
        if self.config.save_to_disk {
            self.persist(&cleaned, &vocabulary, &encoded, &mut summary)?;
        } else {
            debug!("Persistence disabled; keeping results in memory only");
        }

        summary.duration_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "Preparation pipeline completed in {}ms: {} records, {} flavor columns",
            summary.duration_ms,
            summary.rows_after,
            summary.vocabulary_size
        );

        Ok(PipelineResult {
            cleaned,
            encoded,
            vocabulary,
            summary,
        })
    }

    /// Write the cleaned table, vocabulary artifact and encoded table to the
    /// output directory.
    fn persist(
        &self,
        cleaned: &DataFrame,
        vocabulary: &FlavorVocabulary,
        encoded: &DataFrame,
        summary: &mut PrepSummary,
    ) -> Result<()> {
        fs::create_dir_all(&self.config.output_dir).context(format!(
            "creating output directory {}",
            self.config.output_dir.display()
        ))?;

        let clean_path = self.config.output_dir.join(&self.config.clean_file_name);
        write_csv(cleaned.clone(), &clean_path)?;
        info!("Saved cleaned table to {}", clean_path.display());
        summary.add_action(PrepAction::new(
            ActionType::ArtifactWritten,
            clean_path.display().to_string(),
            "Cleaned table for the recommender",
        ));
        summary.artifacts_written.push(clean_path);

        let vocabulary_path = self
            .config
            .output_dir
            .join(&self.config.vocabulary_file_name);
        vocabulary.save(&vocabulary_path)?;
        summary.add_action(PrepAction::new(
            ActionType::ArtifactWritten,
            vocabulary_path.display().to_string(),
            "Vocabulary artifact for prediction-time encoding",
        ));
        summary.artifacts_written.push(vocabulary_path);

        let encoded_path = self.config.output_dir.join(&self.config.encoded_file_name);
        write_csv(encoded.clone(), &encoded_path)?;
        info!("Saved encoded table to {}", encoded_path.display());
        summary.add_action(PrepAction::new(
            ActionType::ArtifactWritten,
            encoded_path.display().to_string(),
            "Encoded table for model fitting",
        ));
        summary.artifacts_written.push(encoded_path);

        Ok(())
    }
}

fn write_csv(mut df: DataFrame, path: &Path) -> Result<()> {
    let mut file = fs::File::create(path)
        .context(format!("creating output file {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)?;
    Ok(())
}

/// Builder for [`Pipeline`].
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
}

impl PipelineBuilder {
    /// Set the pipeline configuration. Defaults to
    /// [`PipelineConfig::default()`] if not provided.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the pipeline, validating the configuration.
    pub fn build(self) -> Result<Pipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            config,
            selector: ColumnSelector,
            normalizer: FlavorNormalizer,
            encoder: FlavorEncoder,
        })
    }
}
