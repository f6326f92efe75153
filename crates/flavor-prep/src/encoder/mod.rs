//! Categorical encoding of the flavor column.
//!
//! Expands the per-record flavor token list into a fixed-width binary
//! indicator matrix: one column per vocabulary token, in vocabulary order,
//! appended after all retained columns. Column order is a pure function of
//! the supplied vocabulary, never of per-run token discovery, so a single
//! live record can be encoded against a previously fixed vocabulary.

mod request;

pub use request::{EncodedRequest, encode_request};

use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::config::UnknownTokenPolicy;
use crate::error::Result;
use crate::utils::str_column;
use crate::vocabulary::FlavorVocabulary;

/// What the encoder left out: occurrences of record tokens that are not in
/// the vocabulary and therefore have no column.
#[derive(Debug, Clone, Default)]
pub struct EncodingReport {
    /// Total occurrences dropped across all records.
    pub unknown_token_count: usize,
    /// The distinct dropped tokens, sorted.
    pub unknown_tokens: Vec<String>,
}

/// One-hot encoder over a fixed flavor vocabulary.
pub struct FlavorEncoder;

impl FlavorEncoder {
    /// Replace the flavor column with `vocabulary.len()` binary columns
    /// named by token. For record `r` and token `t` at position `i`,
    /// column `i` is 1 iff `t` is in `r`'s token list.
    ///
    /// A record token absent from the vocabulary gets no column; under
    /// [`UnknownTokenPolicy::Report`] the drops are counted and logged at
    /// warn level, under [`UnknownTokenPolicy::Drop`] they are omitted
    /// silently. Either way the returned report carries the counts.
    pub fn encode(
        &self,
        df: DataFrame,
        vocabulary: &FlavorVocabulary,
        flavor_column: &str,
        policy: UnknownTokenPolicy,
    ) -> Result<(DataFrame, EncodingReport)> {
        let height = df.height();
        let mut indicators = vec![vec![0u8; height]; vocabulary.len()];
        let mut unknown: BTreeMap<String, usize> = BTreeMap::new();

        {
            let flavors = str_column(&df, flavor_column)?;
            for (row, opt_val) in flavors.into_iter().enumerate() {
                let Some(val) = opt_val else { continue };
                for token in val.split_whitespace() {
                    match vocabulary.position(token) {
                        Some(i) => indicators[i][row] = 1,
                        None => *unknown.entry(token.to_string()).or_insert(0) += 1,
                    }
                }
            }
        }

        let mut df = df.drop(flavor_column)?;
        for (i, token) in vocabulary.tokens().iter().enumerate() {
            let column = Series::new(token.as_str().into(), std::mem::take(&mut indicators[i]));
            df.with_column(column)?;
        }

        let report = EncodingReport {
            unknown_token_count: unknown.values().sum(),
            unknown_tokens: unknown.into_keys().collect(),
        };

        if report.unknown_token_count > 0 {
            match policy {
                UnknownTokenPolicy::Report => warn!(
                    "Dropped {} occurrences of {} tokens absent from the vocabulary: {:?}",
                    report.unknown_token_count,
                    report.unknown_tokens.len(),
                    report.unknown_tokens
                ),
                UnknownTokenPolicy::Drop => debug!(
                    "Dropped {} unknown token occurrences",
                    report.unknown_token_count
                ),
            }
        }

        debug!(
            "Encoded {} records into {} indicator columns",
            height,
            vocabulary.len()
        );

        Ok((df, report))
    }
}
