//! Shared helpers used across the pipeline stages.

use polars::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::error::{PrepError, Result};

/// Seed folded into every fingerprint so plain string hashes and
/// vocabulary fingerprints never collide by construction.
const FINGERPRINT_SEED: u64 = 0x6672_7072;

/// Stable 64-bit fingerprint over an ordered token list, hex-encoded.
///
/// Guards training/prediction schema skew; not a cryptographic commitment.
pub fn stable_fingerprint(tokens: &[String]) -> String {
    let mut hasher = DefaultHasher::new();
    FINGERPRINT_SEED.hash(&mut hasher);
    tokens.len().hash(&mut hasher);
    for token in tokens {
        token.hash(&mut hasher);
    }
    format!("{:016x}", hasher.finish())
}

/// Borrow a column as a string array, mapping an absent column to
/// [`PrepError::ColumnNotFound`].
pub fn str_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked> {
    let column = df
        .column(name)
        .map_err(|_| PrepError::ColumnNotFound(name.to_string()))?;
    Ok(column.as_materialized_series().str()?)
}
