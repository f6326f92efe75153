//! Column selection and row-level cleaning of the merged dataset.
//!
//! This module provides:
//! - Projection down to the required columns, failing on schema mismatch
//! - Removal of rows with missing values in any required column
//! - Flavor text normalization (see [`normalizer`])

mod normalizer;

pub use normalizer::{FlavorNormalizer, REPLACEMENT_RULES, normalize_flavor_text};

use polars::prelude::*;
use tracing::{debug, info};

use crate::error::{PrepError, Result};
use crate::types::{ActionType, PrepAction};

/// Projects the merged dataset down to the required columns and removes
/// incomplete records.
pub struct ColumnSelector;

impl ColumnSelector {
    /// Select the required columns, in their configured order, and drop any
    /// row holding a missing value in one of them.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::SchemaMismatch`] listing every required column
    /// absent from the input. A missing column indicates an upstream data
    /// contract violation and is never silently recovered.
    pub fn select_required(
        &self,
        df: DataFrame,
        required: &[String],
    ) -> Result<(DataFrame, Vec<PrepAction>)> {
        let mut actions = Vec::new();

        let present: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();

        let missing: Vec<String> = required
            .iter()
            .filter(|name| !present.contains(name))
            .cloned()
            .collect();

        if !missing.is_empty() {
            return Err(PrepError::SchemaMismatch { missing });
        }

        let selection: Vec<PlSmallStr> = required.iter().map(|s| s.as_str().into()).collect();
        let df = df.select(selection)?;

        actions.push(PrepAction::new(
            ActionType::ColumnsSelected,
            "dataset",
            format!("Selected {} required columns", required.len()),
        ));
        debug!("Selected columns: {:?}", required);

        let before_rows = df.height();
        let df = Self::drop_incomplete_rows(df, required)?;
        let rows_dropped = before_rows - df.height();

        if rows_dropped > 0 {
            let pct = (rows_dropped as f64 / before_rows as f64) * 100.0;
            info!(
                "Removed {} rows with missing required values ({:.1}%)",
                rows_dropped, pct
            );
            actions.push(PrepAction::new(
                ActionType::RowsDropped,
                "dataset",
                format!(
                    "Removed {} rows with missing required values ({:.1}%)",
                    rows_dropped, pct
                ),
            ));
        } else {
            debug!("No rows with missing required values");
        }

        Ok((df, actions))
    }

    /// Keep only rows where every required column is non-null. The returned
    /// frame is renumbered contiguously by the filter.
    fn drop_incomplete_rows(df: DataFrame, required: &[String]) -> Result<DataFrame> {
        let mut keep: Option<BooleanChunked> = None;

        for name in required {
            let col_mask = df.column(name)?.as_materialized_series().is_not_null();
            keep = Some(match keep {
                Some(acc) => &acc & &col_mask,
                None => col_mask,
            });
        }

        match keep {
            Some(mask) => Ok(df.filter(&mask)?),
            None => Ok(df),
        }
    }
}
