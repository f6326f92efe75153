//! Flavor text normalization.
//!
//! The raw `flavors` field is free text: space-separated flavor words with a
//! handful of known misspellings and ambiguous names. Normalization rewrites
//! the whole string through an ordered rule table, then splits it into a
//! deduplicated, sorted token list. The same function serves the batch table
//! rewrite and the live single-request path, so the two can never drift.

use polars::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::types::{ActionType, PrepAction};
use crate::utils::str_column;

/// Ordered substring replacement rules applied to the raw flavor text.
///
/// Order matters: each rule sees the output of the previous one. A rule
/// matches anywhere in the string, including inside other words. The first
/// two fix misspellings; the rest disambiguate single-word names into
/// underscore-joined tokens.
pub const REPLACEMENT_RULES: [(&str, &str); 5] = [
    ("tomatoe", "tomato"),
    ("whisky", "whiskey"),
    ("bay", "bay_leaf"),
    ("earl", "earl_grey"),
    ("graham", "graham_cracker"),
];

/// Normalize one raw flavor string into its canonical token list:
/// substitution rules in order, whitespace split, dedup, lexicographic sort.
///
/// Running this on the space-joined output of a previous run is a no-op:
/// a match already followed by the remainder of its replacement (`bay` in
/// `bay_leaf`) is left alone, so canonical tokens survive re-normalization.
pub fn normalize_flavor_text(raw: &str) -> Vec<String> {
    let mut text = raw.to_string();
    for (pattern, replacement) in REPLACEMENT_RULES {
        text = replace_unless_canonical(&text, pattern, replacement);
    }

    let mut tokens: Vec<String> = text.split_whitespace().map(str::to_string).collect();
    tokens.sort_unstable();
    tokens.dedup();
    tokens
}

/// Replace every occurrence of `pattern`, skipping occurrences that are
/// already followed by the remainder of `replacement`.
///
/// For the misspelling rules the replacement does not start with the
/// pattern, so the skip never applies and this is a plain substring replace.
fn replace_unless_canonical(text: &str, pattern: &str, replacement: &str) -> String {
    let suffix = replacement.strip_prefix(pattern).filter(|s| !s.is_empty());

    let mut out = String::with_capacity(text.len() + replacement.len());
    let mut rest = text;
    while let Some(idx) = rest.find(pattern) {
        out.push_str(&rest[..idx]);
        let after = &rest[idx + pattern.len()..];
        match suffix {
            Some(sfx) if after.starts_with(sfx) => {
                // Already in canonical form; copy through untouched.
                out.push_str(pattern);
            }
            _ => out.push_str(replacement),
        }
        rest = after;
    }
    out.push_str(rest);
    out
}

/// Rewrites the flavor column of the selected table into canonical form.
pub struct FlavorNormalizer;

impl FlavorNormalizer {
    /// Replace the flavor column with its normalized form: each value becomes
    /// the record's sorted, deduplicated tokens re-joined with single spaces.
    pub fn normalize_column(
        &self,
        mut df: DataFrame,
        flavor_column: &str,
    ) -> Result<(DataFrame, Vec<PrepAction>)> {
        let flavors = str_column(&df, flavor_column)?;

        let mut rewritten = Vec::with_capacity(flavors.len());
        for opt_val in flavors.into_iter() {
            match opt_val {
                Some(val) => rewritten.push(Some(normalize_flavor_text(val).join(" "))),
                None => rewritten.push(None),
            }
        }

        let normalized = Series::new(flavor_column.into(), rewritten);
        df.replace(flavor_column, normalized)?;

        debug!(
            "Normalized '{}' for {} records through {} replacement rules",
            flavor_column,
            df.height(),
            REPLACEMENT_RULES.len()
        );

        let actions = vec![PrepAction::new(
            ActionType::FlavorsNormalized,
            flavor_column,
            format!(
                "Normalized flavor text for {} records ({} replacement rules)",
                df.height(),
                REPLACEMENT_RULES.len()
            ),
        )];

        Ok((df, actions))
    }
}
