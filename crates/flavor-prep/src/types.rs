use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::vocabulary::FlavorVocabulary;

/// Kind of action taken during a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    ColumnsSelected,
    RowsDropped,
    FlavorsNormalized,
    VocabularyExtracted,
    TokensDropped,
    ArtifactWritten,
}

/// A single action taken by a pipeline stage, for the run summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepAction {
    pub action_type: ActionType,
    /// Column or artifact the action applies to, or "dataset".
    pub target: String,
    pub description: String,
}

impl PrepAction {
    pub fn new(
        action_type: ActionType,
        target: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            action_type,
            target: target.into(),
            description: description.into(),
        }
    }
}

/// Human-readable summary of what the pipeline did.
///
/// Serialized as the `--json` output of the CLI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrepSummary {
    pub rows_before: usize,
    pub rows_after: usize,
    /// Rows removed for holding a missing value in a required column.
    pub rows_dropped: usize,
    pub columns_before: usize,
    pub columns_after: usize,
    pub vocabulary_size: usize,
    /// Occurrences of record tokens absent from the vocabulary. Only
    /// populated under the Report policy; the Drop policy stays silent.
    pub unknown_token_count: usize,
    /// The distinct unknown tokens, sorted. Empty under the Drop policy.
    pub unknown_tokens: Vec<String>,
    pub actions: Vec<PrepAction>,
    pub duration_ms: u64,
    /// Artifacts written this run, in write order. Empty when persistence
    /// is disabled.
    pub artifacts_written: Vec<PathBuf>,
}

impl PrepSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_action(&mut self, action: PrepAction) {
        self.actions.push(action);
    }
}

/// The outcome of a successful pipeline run.
///
/// The encoded table is a derived, disposable artifact; the vocabulary is
/// the one output with a lifetime beyond this run.
#[derive(Debug)]
pub struct PipelineResult {
    /// The flavor-normalized table (flavors as space-joined sorted tokens).
    pub cleaned: DataFrame,
    /// The one-hot-encoded table consumed by model fitting.
    pub encoded: DataFrame,
    /// The canonical vocabulary extracted this run.
    pub vocabulary: FlavorVocabulary,
    pub summary: PrepSummary,
}
