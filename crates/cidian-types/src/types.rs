use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Raw query typed by the user
    TextInput(String),
    /// User picked the n-th item (1-based) of the last result list
    Select(usize),
    /// Incremental push from a running lookup
    ResultsUpdated(ResultUpdate),
    /// Final result list of a lookup
    ShowResults(ResultUpdate),
    /// Free-form status line for the renderer
    StatusUpdate(String),
    /// Ask the renderer to open a url
    OpenUrl(String),
}

/// Snapshot of a query's results at some point of its pipeline
#[derive(Debug, Clone)]
pub struct ResultUpdate {
    pub query_id: u64,
    pub query: String,
    pub items: Vec<ResultItem>,
    /// Set on the final list; no update for this query follows it
    pub done: bool,
}

/// One presentable row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultItem {
    pub title: String,
    pub subtitle: String,
    pub action: ItemAction,
}

impl ResultItem {
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>, action: ItemAction) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
            action,
        }
    }

    /// The "No Results Found" row for a word
    pub fn no_results(word: &str) -> Self {
        Self::new("No Results Found", word, ItemAction::None)
    }
}

/// What happens when an item is selected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemAction {
    None,
    /// Replace the current query with this text
    ChangeQuery(String),
    OpenUrl(String),
    StartDownload,
    RefreshProgress,
}
