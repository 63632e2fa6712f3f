use std::collections::HashSet;

use cidian_types::ResultItem;

/// Insertion-ordered, duplicate-free list of items keyed by title.
///
/// The first item with a given title wins; later ones are dropped.
#[derive(Debug, Clone, Default)]
pub struct ResultBatch {
    items: Vec<ResultItem>,
    seen: HashSet<String>,
}

impl ResultBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when an item with the same title is already present
    pub fn push(&mut self, item: ResultItem) -> bool {
        if !self.seen.insert(item.title.clone()) {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = ResultItem>) -> usize {
        let mut added = 0;
        for item in items {
            if self.push(item) {
                added += 1;
            }
        }
        added
    }

    pub fn items(&self) -> &[ResultItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<ResultItem> {
        self.items
    }
}
