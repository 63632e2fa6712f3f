use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cidian_bootstrap::BootstrapManager;
use cidian_core::{LookupEngine, LookupError, Query, UpdateSink};
use cidian_types::{ItemAction, ResultItem, ResultUpdate};
use kanal::AsyncSender;
use tokio_util::sync::CancellationToken;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One interactive user: at most one live lookup, plus the list the user can
/// select from.
pub struct Session {
    engine: LookupEngine,
    bootstrap: Arc<BootstrapManager>,
    keyword: Option<String>,
    next_id: AtomicU64,
    current: Mutex<CancellationToken>,
    last: Mutex<ResultUpdate>,
}

impl Session {
    pub fn new(engine: LookupEngine, bootstrap: Arc<BootstrapManager>, keyword: &str) -> Self {
        Self {
            engine,
            bootstrap,
            keyword: (!keyword.is_empty()).then(|| keyword.to_string()),
            next_id: AtomicU64::new(1),
            current: Mutex::new(CancellationToken::new()),
            last: Mutex::new(ResultUpdate {
                query_id: 0,
                query: String::new(),
                items: Vec::new(),
                done: true,
            }),
        }
    }

    pub fn bootstrap(&self) -> &Arc<BootstrapManager> {
        &self.bootstrap
    }

    /// Text of a pivot query without the action keyword it was built with.
    ///
    /// Only applies to queries produced by `ItemAction::ChangeQuery`; typed
    /// queries are dispatched as they are.
    pub fn pivot_query<'a>(&self, text: &'a str) -> &'a str {
        let Some(keyword) = &self.keyword else {
            return text;
        };
        text.strip_prefix(keyword.as_str())
            .and_then(|rest| rest.strip_prefix(' '))
            .unwrap_or(text)
    }

    /// Run one query, cancelling whatever ran before it.
    ///
    /// Returns the final list, or `None` when a newer query superseded this
    /// one before it finished.
    pub async fn submit(&self, text: &str, updates: &AsyncSender<ResultUpdate>) -> Option<ResultUpdate> {
        let query_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let token = CancellationToken::new();
        {
            let mut current = lock(&self.current);
            current.cancel();
            *current = token.clone();
        }

        let items = if self.bootstrap.needs_bootstrap() {
            tracing::debug!("Dataset missing, answering with bootstrap status");
            vec![self.bootstrap.status()]
        } else {
            let mut query = Query::new(text);
            if let Some(keyword) = &self.keyword {
                query = query.with_keyword(keyword.as_str());
            }
            let sink = UpdateSink::new(updates.clone(), query_id, text);

            match self.engine.lookup(&query, &sink, &token).await {
                Ok(items) => items,
                Err(LookupError::Cancelled) => {
                    tracing::debug!("Query {} cancelled", query_id);
                    return None;
                }
                Err(e) => {
                    tracing::warn!("Lookup of '{}' failed: {}", text, e);
                    vec![ResultItem::new("Lookup failed", e.to_string(), ItemAction::None)]
                }
            }
        };

        let update = ResultUpdate {
            query_id,
            query: text.to_string(),
            items,
            done: true,
        };

        // Hold the token lock so a newer submit cannot slip in between the
        // check and the store
        let current = lock(&self.current);
        if token.is_cancelled() {
            return None;
        }
        *lock(&self.last) = update.clone();
        drop(current);

        Some(update)
    }

    /// Action of the n-th item (1-based) of the last finished list
    pub fn select(&self, index: usize) -> Option<ItemAction> {
        let last = lock(&self.last);
        index
            .checked_sub(1)
            .and_then(|idx| last.items.get(idx))
            .map(|item| item.action.clone())
    }

    /// Text of the last finished query
    pub fn last_query(&self) -> String {
        lock(&self.last).query.clone()
    }

    /// Cancel the live lookup, if any
    pub fn cancel(&self) {
        lock(&self.current).cancel();
    }
}
