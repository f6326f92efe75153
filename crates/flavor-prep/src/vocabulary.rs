//! The canonical flavor vocabulary.
//!
//! The vocabulary is the one output whose lifetime outlives a pipeline run:
//! extracted once at training time, persisted, and loaded unchanged at
//! prediction time to rebuild the exact encoding schema. It is persisted as
//! a versioned artifact (tokens + fingerprint + creation timestamp) so the
//! prediction path can detect skew instead of trusting file-path convention.

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{PrepError, Result, ResultExt};
use crate::utils::{stable_fingerprint, str_column};

/// The globally sorted, deduplicated set of flavor tokens, with the
/// fingerprint that stamps the encoding schema it defines.
///
/// Append-never once written: a new training run that changes the token set
/// produces a new fingerprint, and any consumer holding the old one fails
/// loudly instead of encoding against the wrong schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlavorVocabulary {
    tokens: Vec<String>,
    fingerprint: String,
    created_at: String,
}

impl FlavorVocabulary {
    /// Build a vocabulary from an arbitrary token collection; sorts and
    /// deduplicates.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let unique: BTreeSet<String> = tokens.into_iter().map(Into::into).collect();
        let tokens: Vec<String> = unique.into_iter().collect();
        if tokens.is_empty() {
            return Err(PrepError::EmptyVocabulary("<tokens>".to_string()));
        }

        let fingerprint = stable_fingerprint(&tokens);
        Ok(Self {
            tokens,
            fingerprint,
            created_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    /// Compute the union of all per-record token lists in the normalized
    /// table. The flavor column holds space-joined canonical tokens.
    pub fn extract(df: &DataFrame, flavor_column: &str) -> Result<Self> {
        let flavors = str_column(df, flavor_column)?;

        let mut unique = BTreeSet::new();
        for opt_val in flavors.into_iter() {
            if let Some(val) = opt_val {
                unique.extend(val.split_whitespace().map(str::to_string));
            }
        }

        if unique.is_empty() {
            return Err(PrepError::EmptyVocabulary(flavor_column.to_string()));
        }

        let tokens: Vec<String> = unique.into_iter().collect();
        let fingerprint = stable_fingerprint(&tokens);
        debug!(
            "Extracted {} distinct flavor tokens (fingerprint {})",
            tokens.len(),
            fingerprint
        );

        Ok(Self {
            tokens,
            fingerprint,
            created_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    /// The tokens in encoding order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Number of tokens, i.e. the width of every encoded record.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Column position of a token, if it is part of the schema. The token
    /// list is sorted, so this is a binary search.
    pub fn position(&self, token: &str) -> Option<usize> {
        self.tokens.binary_search_by(|t| t.as_str().cmp(token)).ok()
    }

    /// The schema fingerprint stamped into the artifact.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    /// Persist the artifact as JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).context(format!("writing vocabulary to {}", path.display()))?;
        info!(
            "Saved vocabulary ({} tokens) to {}",
            self.tokens.len(),
            path.display()
        );
        Ok(())
    }

    /// Load a persisted artifact and verify its fingerprint against the
    /// token list it carries.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::SchemaSkew`] if the stored fingerprint does not
    /// match the stored tokens: the artifact was edited or truncated, and
    /// encoding against it would silently disagree with the trained model.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .context(format!("reading vocabulary from {}", path.display()))?;
        let vocabulary: Self = serde_json::from_str(&json)?;

        let derived = stable_fingerprint(&vocabulary.tokens);
        if derived != vocabulary.fingerprint {
            return Err(PrepError::SchemaSkew {
                expected: vocabulary.fingerprint.clone(),
                actual: derived,
            });
        }

        debug!(
            "Loaded vocabulary ({} tokens, fingerprint {}) from {}",
            vocabulary.tokens.len(),
            vocabulary.fingerprint,
            path.display()
        );
        Ok(vocabulary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    fn normalized_frame() -> DataFrame {
        DataFrame::new(vec![
            Series::new("recipe_name".into(), &["Tart", "Pie", "Cake"]).into(),
            Series::new(
                "flavors".into(),
                &["lemon vanilla", "chocolate lemon", "chocolate"],
            )
            .into(),
        ])
        .unwrap()
    }

    #[test]
    fn test_extract_sorted_union() {
        let vocabulary = FlavorVocabulary::extract(&normalized_frame(), "flavors").unwrap();
        assert_eq!(vocabulary.tokens(), ["chocolate", "lemon", "vanilla"]);
        assert_eq!(vocabulary.len(), 3);
    }

    #[test]
    fn test_extract_is_stable() {
        let df = normalized_frame();
        let a = FlavorVocabulary::extract(&df, "flavors").unwrap();
        let b = FlavorVocabulary::extract(&df, "flavors").unwrap();
        assert_eq!(a.tokens(), b.tokens());
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_extract_empty_is_error() {
        let df = DataFrame::new(vec![
            Series::new("flavors".into(), &["", "  "]).into(),
        ])
        .unwrap();

        assert!(matches!(
            FlavorVocabulary::extract(&df, "flavors"),
            Err(PrepError::EmptyVocabulary(_))
        ));
    }

    #[test]
    fn test_from_tokens_sorts_and_dedups() {
        let vocabulary =
            FlavorVocabulary::from_tokens(["mint", "basil", "mint", "bay_leaf"]).unwrap();
        assert_eq!(vocabulary.tokens(), ["basil", "bay_leaf", "mint"]);
    }

    #[test]
    fn test_position_binary_search() {
        let vocabulary =
            FlavorVocabulary::from_tokens(["basil", "bay_leaf", "chocolate"]).unwrap();
        assert_eq!(vocabulary.position("basil"), Some(0));
        assert_eq!(vocabulary.position("chocolate"), Some(2));
        assert_eq!(vocabulary.position("mint"), None);
    }

    #[test]
    fn test_save_load_round_trip() {
        let vocabulary = FlavorVocabulary::from_tokens(["basil", "mint"]).unwrap();
        let path = std::env::temp_dir().join(format!(
            "flavor-prep-vocab-{}.json",
            std::process::id()
        ));

        vocabulary.save(&path).unwrap();
        let loaded = FlavorVocabulary::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(vocabulary, loaded);
    }

    #[test]
    fn test_load_detects_tampered_tokens() {
        let vocabulary = FlavorVocabulary::from_tokens(["basil", "mint"]).unwrap();
        let path = std::env::temp_dir().join(format!(
            "flavor-prep-vocab-tampered-{}.json",
            std::process::id()
        ));

        let mut json = serde_json::to_value(&vocabulary).unwrap();
        json["tokens"] = serde_json::json!(["basil", "mint", "rogue"]);
        std::fs::write(&path, serde_json::to_string(&json).unwrap()).unwrap();

        let err = FlavorVocabulary::load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(matches!(err, PrepError::SchemaSkew { .. }));
    }
}
