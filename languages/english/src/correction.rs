//! Spelling correction using SymSpell over an English frequency list.

use std::path::Path;

use cidian_core::dictionary::{CorrectionOracle, Suggestion};
use symspell::{SymSpell, SymSpellBuilder, UnicodeStringStrategy, Verbosity};

#[derive(Debug, thiserror::Error)]
pub enum CorrectionLoadError {
    #[error("Frequency list not found: {0}")]
    NotFound(String),

    #[error("Invalid correction settings: {0}")]
    Settings(String),

    #[error("Frequency list could not be loaded: {0}")]
    Load(String),
}

/// Correction oracle bounded by a maximum edit distance
pub struct SymSpellOracle {
    engine: SymSpell<UnicodeStringStrategy>,
    max_edit_distance: i64,
}

impl SymSpellOracle {
    /// Empty oracle, words are added with [`SymSpellOracle::add_word`]
    pub fn new(max_edit_distance: i64) -> Result<Self, CorrectionLoadError> {
        let engine: SymSpell<UnicodeStringStrategy> = SymSpellBuilder::default()
            .max_dictionary_edit_distance(max_edit_distance)
            .build()
            .map_err(|e| CorrectionLoadError::Settings(e.to_string()))?;

        Ok(Self {
            engine,
            max_edit_distance,
        })
    }

    /// Load a `word count` per line frequency list
    pub fn from_file(path: &Path, max_edit_distance: i64) -> Result<Self, CorrectionLoadError> {
        if !path.exists() {
            return Err(CorrectionLoadError::NotFound(path.display().to_string()));
        }

        let mut oracle = Self::new(max_edit_distance)?;
        tracing::info!("Loading frequency list from {}", path.display());
        if !oracle
            .engine
            .load_dictionary(path.to_string_lossy().as_ref(), 0, 1, " ")
        {
            return Err(CorrectionLoadError::Load(path.display().to_string()));
        }

        Ok(oracle)
    }

    pub fn add_word(&mut self, word: &str, count: i64) -> bool {
        self.engine
            .load_dictionary_line(&format!("{word} {count}"), 0, 1, " ")
    }
}

impl CorrectionOracle for SymSpellOracle {
    fn correct(&self, token: &str) -> Vec<Suggestion> {
        let token = token.trim().to_lowercase();
        if token.is_empty() {
            return Vec::new();
        }

        self.engine
            .lookup(&token, Verbosity::Closest, self.max_edit_distance)
            .into_iter()
            .map(|s| Suggestion {
                term: s.term,
                distance: s.distance,
            })
            .collect()
    }
}
