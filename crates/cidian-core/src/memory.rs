use std::collections::HashMap;

use crate::dictionary::{Entry, LookupStore, StoreError};
use crate::preprocess::sanitize_prefix;

/// In-memory store with the same matching and ranking rules as the SQLite one
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Vec<Row>,
    by_key: HashMap<String, usize>,
}

#[derive(Debug)]
struct Row {
    entry: Entry,
    stripped: String,
    frequency: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry; a second entry with the same key replaces nothing
    pub fn insert(&mut self, entry: Entry, frequency: i64) {
        let folded = entry.key.to_lowercase();
        if self.by_key.contains_key(&folded) {
            return;
        }
        self.by_key.insert(folded, self.rows.len());
        self.rows.push(Row {
            stripped: sanitize_prefix(&entry.key),
            entry,
            frequency,
        });
    }

    pub fn with_entries(entries: impl IntoIterator<Item = (Entry, i64)>) -> Self {
        let mut store = Self::new();
        for (entry, frequency) in entries {
            store.insert(entry, frequency);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn find(&self, key: &str) -> Option<&Entry> {
        self.by_key
            .get(&key.to_lowercase())
            .map(|&idx| &self.rows[idx].entry)
    }
}

impl LookupStore for MemoryStore {
    fn get_exact(&self, key: &str) -> Result<Option<Entry>, StoreError> {
        Ok(self.find(key).cloned())
    }

    fn get_many(&self, keys: &[String]) -> Result<Vec<Entry>, StoreError> {
        let mut found: Vec<Entry> = Vec::new();
        for key in keys {
            if let Some(entry) = self.find(key)
                && !found.contains(entry)
            {
                found.push(entry.clone());
            }
        }
        Ok(found)
    }

    fn get_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<Entry>, StoreError> {
        let prefix = sanitize_prefix(prefix);
        if prefix.is_empty() {
            return Ok(Vec::new());
        }

        let mut matches: Vec<&Row> = self
            .rows
            .iter()
            .filter(|row| row.stripped.starts_with(&prefix))
            .collect();
        // Stable: equal ranks keep insertion order
        matches.sort_by_key(|row| (row.frequency <= 0, row.frequency));

        Ok(matches
            .into_iter()
            .take(limit)
            .map(|row| row.entry.clone())
            .collect())
    }
}
