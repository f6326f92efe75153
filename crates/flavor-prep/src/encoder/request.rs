//! Encoding of a single live request.
//!
//! The web layer collects up to three free-text flavor entries from a user.
//! Those entries must travel through the exact same normalization rules and
//! encoder logic as the training data, against the persisted vocabulary, or
//! the model sees a schema it was never trained on. This module reuses
//! [`normalize_flavor_text`] and mirrors the batch indicator logic for one
//! row.

use polars::prelude::*;
use tracing::warn;

use crate::cleaner::normalize_flavor_text;
use crate::config::UnknownTokenPolicy;
use crate::error::{PrepError, Result};
use crate::vocabulary::FlavorVocabulary;

/// One user submission encoded against a fixed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRequest {
    values: Vec<u8>,
    tokens: Vec<String>,
    unknown_tokens: Vec<String>,
    fingerprint: String,
}

impl EncodedRequest {
    /// The indicator row, exactly `vocabulary.len()` wide.
    pub fn values(&self) -> &[u8] {
        &self.values
    }

    /// The normalized tokens that matched a vocabulary column.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Normalized tokens with no vocabulary column, dropped from the row.
    pub fn unknown_tokens(&self) -> &[String] {
        &self.unknown_tokens
    }

    /// Fingerprint of the vocabulary this request was encoded against.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Materialize the request as a single-row frame with the training
    /// column schema, ready to hand to the model.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::SchemaSkew`] if `vocabulary` is not the one the
    /// request was encoded against.
    pub fn into_row(self, vocabulary: &FlavorVocabulary) -> Result<DataFrame> {
        if vocabulary.fingerprint() != self.fingerprint {
            return Err(PrepError::SchemaSkew {
                expected: self.fingerprint,
                actual: vocabulary.fingerprint().to_string(),
            });
        }

        let columns: Vec<Column> = vocabulary
            .tokens()
            .iter()
            .zip(&self.values)
            .map(|(token, value)| Series::new(token.as_str().into(), vec![*value]).into())
            .collect();

        Ok(DataFrame::new(columns)?)
    }
}

/// Normalize and encode one incoming request (up to three free-text flavor
/// entries in the app) against the persisted vocabulary.
///
/// The entries are joined with single spaces before normalization, matching
/// how the training path treats the flavor field as one string.
pub fn encode_request(
    flavors: &[&str],
    vocabulary: &FlavorVocabulary,
    policy: UnknownTokenPolicy,
) -> EncodedRequest {
    let joined = flavors.join(" ");
    let normalized = normalize_flavor_text(&joined);

    let mut values = vec![0u8; vocabulary.len()];
    let mut tokens = Vec::new();
    let mut unknown_tokens = Vec::new();

    for token in normalized {
        match vocabulary.position(&token) {
            Some(i) => {
                values[i] = 1;
                tokens.push(token);
            }
            None => unknown_tokens.push(token),
        }
    }

    if !unknown_tokens.is_empty() && policy == UnknownTokenPolicy::Report {
        warn!(
            "Request contains {} flavors unknown to the vocabulary: {:?}",
            unknown_tokens.len(),
            unknown_tokens
        );
    }

    EncodedRequest {
        values,
        tokens,
        unknown_tokens,
        fingerprint: vocabulary.fingerprint().to_string(),
    }
}
