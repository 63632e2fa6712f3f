use std::hash::{Hash, Hasher};

/// One dictionary record
///
/// Identity is the `key` alone: two entries with the same key are the same
/// word even when the other fields differ.
#[derive(Debug, Clone, Default)]
pub struct Entry {
    /// Canonical word form
    pub key: String,
    pub phonetic: String,
    /// Newline separated senses in the target language
    pub translation: String,
    /// Newline separated senses in the source language
    pub definition: String,
    /// Slash separated morphological forms, e.g. `p:went/d:gone`
    pub exchange: String,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Entry {}

impl Hash for Entry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

/// Read-only word index backing every lookup
///
/// Calls may block on disk I/O; the lookup engine runs them on the blocking
/// pool.
pub trait LookupStore: Send + Sync {
    /// Exact match on the key, `None` when absent
    fn get_exact(&self, key: &str) -> Result<Option<Entry>, StoreError>;

    /// Entries for every key that exists. An empty key list yields no entries.
    fn get_many(&self, keys: &[String]) -> Result<Vec<Entry>, StoreError>;

    /// Entries whose sanitized key starts with the sanitized prefix.
    ///
    /// Ranked by frequency: positive frequencies first, then ascending
    /// frequency, then storage order.
    fn get_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<Entry>, StoreError>;
}

/// Spelling correction for a single token
pub trait CorrectionOracle: Send + Sync {
    /// Candidate keys within the configured edit distance, closest first
    fn correct(&self, token: &str) -> Vec<Suggestion>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub term: String,
    pub distance: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Dataset not found: {0}")]
    NotFound(String),

    #[error("Backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}
