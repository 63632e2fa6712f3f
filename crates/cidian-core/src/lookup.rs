use std::future::Future;
use std::sync::Arc;

use cidian_translator::{SynonymProvider, TranslationProvider};
use cidian_types::{ResultItem, ResultUpdate};
use kanal::AsyncSender;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

use crate::batch::ResultBatch;
use crate::dictionary::{CorrectionOracle, Entry, LookupStore, StoreError};
use crate::present::{Presenter, joined, senses};
use crate::preprocess::{DefaultPreprocessor, Preprocessor};
use crate::query::{Query, RetrievalMode, classify};

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Lookup cancelled")]
    Cancelled,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Lookup task failed: {0}")]
    Task(#[from] JoinError),
}

/// Per-engine settings, fixed at startup
#[derive(Debug, Clone)]
pub struct LookupOptions {
    /// Cap on prefix matches
    pub prefix_limit: usize,
    pub show_english_definition: bool,
    /// Url template for a word, `{}` is the word. Empty disables it.
    pub word_website: String,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            prefix_limit: 20,
            show_english_definition: false,
            word_website: String::new(),
        }
    }
}

/// Where a running lookup pushes its intermediate results
pub struct UpdateSink {
    tx: Option<AsyncSender<ResultUpdate>>,
    query_id: u64,
    query: String,
}

impl UpdateSink {
    pub fn new(tx: AsyncSender<ResultUpdate>, query_id: u64, query: impl Into<String>) -> Self {
        Self {
            tx: Some(tx),
            query_id,
            query: query.into(),
        }
    }

    /// A sink that drops every update
    pub fn discard() -> Self {
        Self {
            tx: None,
            query_id: 0,
            query: String::new(),
        }
    }

    pub async fn push(&self, items: &[ResultItem]) {
        let Some(tx) = &self.tx else {
            return;
        };

        let update = ResultUpdate {
            query_id: self.query_id,
            query: self.query.clone(),
            items: items.to_vec(),
            done: false,
        };
        if let Err(e) = tx.send(update).await {
            tracing::debug!("Result receiver gone: {}", e);
        }
    }
}

/// Everything a single lookup run needs besides the word
struct Run<'a> {
    present: Presenter<'a>,
    sink: &'a UpdateSink,
    cancel: &'a CancellationToken,
}

impl Run<'_> {
    fn ensure_live(&self) -> Result<(), LookupError> {
        if self.cancel.is_cancelled() {
            return Err(LookupError::Cancelled);
        }
        Ok(())
    }

    /// Await `fut` unless the run is cancelled first
    async fn guarded<T>(&self, fut: impl Future<Output = T>) -> Result<T, LookupError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(LookupError::Cancelled),
            out = fut => Ok(out),
        }
    }

    /// Run a blocking collaborator call on the blocking pool
    async fn blocking<S, T, F>(&self, target: &Arc<S>, f: F) -> Result<T, LookupError>
    where
        S: ?Sized + Send + Sync + 'static,
        T: Send + 'static,
        F: FnOnce(&S) -> T + Send + 'static,
    {
        let target = Arc::clone(target);
        let task = tokio::task::spawn_blocking(move || f(target.as_ref()));
        Ok(self.guarded(task).await??)
    }
}

/// Query dispatch and multi-source aggregation
pub struct LookupEngine {
    store: Arc<dyn LookupStore>,
    oracle: Arc<dyn CorrectionOracle>,
    synonyms: Arc<dyn SynonymProvider>,
    translations: Arc<dyn TranslationProvider>,
    options: LookupOptions,
}

impl LookupEngine {
    pub fn new(
        store: Arc<dyn LookupStore>,
        oracle: Arc<dyn CorrectionOracle>,
        synonyms: Arc<dyn SynonymProvider>,
        translations: Arc<dyn TranslationProvider>,
        options: LookupOptions,
    ) -> Self {
        Self {
            store,
            oracle,
            synonyms,
            translations,
            options,
        }
    }

    /// Classify the query and run the matching retrieval.
    ///
    /// Intermediate results go to `sink`; the complete list is returned. A
    /// cancelled run returns `LookupError::Cancelled` and whatever was already
    /// pushed stays pushed.
    pub async fn lookup(
        &self,
        query: &Query,
        sink: &UpdateSink,
        cancel: &CancellationToken,
    ) -> Result<Vec<ResultItem>, LookupError> {
        let text = DefaultPreprocessor.process(&query.text);
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let classified = classify(&text);
        tracing::debug!("Query '{}' classified as {:?}", text, classified.mode);

        let run = Run {
            present: Presenter::new(&self.options, query.action_keyword.as_deref()),
            sink,
            cancel,
        };
        let word = classified.word;

        match classified.mode {
            RetrievalMode::FirstLevel => self.first_level(word, &run).await,
            RetrievalMode::Detailed => self.detailed(word, &run).await,
            RetrievalMode::TranslationsOnly => {
                self.field_split(word, RetrievalMode::TranslationsOnly, &run).await
            }
            RetrievalMode::DefinitionsOnly => {
                self.field_split(word, RetrievalMode::DefinitionsOnly, &run).await
            }
            RetrievalMode::ExchangesOnly => {
                self.field_split(word, RetrievalMode::ExchangesOnly, &run).await
            }
            RetrievalMode::SynonymsOnly => self.synonyms_only(word, &run).await,
            RetrievalMode::CrossLanguage => self.cross_language(word, &run).await,
        }
    }

    async fn exact(&self, word: &str, run: &Run<'_>) -> Result<Option<Entry>, LookupError> {
        let key = word.to_string();
        Ok(run.blocking(&self.store, move |store| store.get_exact(&key)).await??)
    }

    /// Exact match, then corrections, then prefix matches
    async fn first_level(&self, word: &str, run: &Run<'_>) -> Result<Vec<ResultItem>, LookupError> {
        let mut batch = ResultBatch::new();

        run.ensure_live()?;
        if let Some(entry) = self.exact(word, run).await? {
            batch.push(run.present.word(&entry));
            run.sink.push(batch.items()).await;
        }

        run.ensure_live()?;
        let corrected = self.corrections(word, run).await?;
        let added = batch.extend(corrected.iter().map(|entry| run.present.word(entry)));
        tracing::debug!("Correction phase added {} entries", added);
        run.sink.push(batch.items()).await;

        run.ensure_live()?;
        let prefix = word.to_string();
        let limit = self.options.prefix_limit;
        let prefixed = run
            .blocking(&self.store, move |store| store.get_prefix(&prefix, limit))
            .await?
            .unwrap_or_else(|e| {
                tracing::warn!("Prefix lookup failed for '{}': {}", word, e);
                Vec::new()
            });
        batch.extend(prefixed.iter().map(|entry| run.present.word(entry)));

        Ok(batch.into_items())
    }

    /// Entries for the oracle's candidates, in candidate order
    async fn corrections(&self, word: &str, run: &Run<'_>) -> Result<Vec<Entry>, LookupError> {
        let token = word.to_string();
        let candidates = run
            .blocking(&self.oracle, move |oracle| oracle.correct(&token))
            .await?;
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = candidates.into_iter().map(|s| s.term).collect();
        let wanted = keys.clone();
        let mut entries = run
            .blocking(&self.store, move |store| store.get_many(&wanted))
            .await?
            .unwrap_or_else(|e| {
                tracing::warn!("Correction lookup failed for '{}': {}", word, e);
                Vec::new()
            });

        entries.sort_by_key(|entry| {
            keys.iter()
                .position(|key| key.eq_ignore_ascii_case(&entry.key))
                .unwrap_or(usize::MAX)
        });
        Ok(entries)
    }

    /// All fields of one word, then its synonyms
    async fn detailed(&self, word: &str, run: &Run<'_>) -> Result<Vec<ResultItem>, LookupError> {
        run.ensure_live()?;
        let Some(entry) = self.exact(word, run).await? else {
            return Ok(vec![ResultItem::no_results(word)]);
        };

        let present = &run.present;
        let mut results = Vec::new();

        if !entry.phonetic.trim().is_empty() {
            results.push(present.info(entry.phonetic.clone(), "Phonetic", &entry.key));
        }
        if !entry.translation.trim().is_empty() {
            results.push(ResultItem::new(
                "Translation",
                joined(&entry.translation),
                present.pivot(&entry.key, RetrievalMode::TranslationsOnly),
            ));
        }
        if !entry.definition.trim().is_empty() {
            results.push(ResultItem::new(
                "Definition",
                joined(&entry.definition),
                present.pivot(&entry.key, RetrievalMode::DefinitionsOnly),
            ));
        }
        if !entry.exchange.trim().is_empty() {
            results.push(ResultItem::new(
                "Exchanges",
                entry.exchange.clone(),
                present.pivot(&entry.key, RetrievalMode::ExchangesOnly),
            ));
        }
        run.sink.push(&results).await;

        run.ensure_live()?;
        let synonyms = run.guarded(self.synonyms.synonyms(&entry.key)).await?;
        if !synonyms.is_empty() {
            results.push(ResultItem::new(
                "Synonym",
                synonyms.join("; "),
                present.pivot(&entry.key, RetrievalMode::SynonymsOnly),
            ));
        }

        if results.is_empty() {
            return Ok(vec![ResultItem::no_results(word)]);
        }
        Ok(results)
    }

    /// One row per translation sense, definition sense or morphological form
    async fn field_split(
        &self,
        word: &str,
        mode: RetrievalMode,
        run: &Run<'_>,
    ) -> Result<Vec<ResultItem>, LookupError> {
        run.ensure_live()?;
        let Some(entry) = self.exact(word, run).await? else {
            return Ok(vec![ResultItem::no_results(word)]);
        };

        let (segments, label): (Vec<&str>, &str) = match mode {
            RetrievalMode::TranslationsOnly => (senses(&entry.translation).collect(), "Translation"),
            RetrievalMode::DefinitionsOnly => (senses(&entry.definition).collect(), "Definitions"),
            _ => (
                entry
                    .exchange
                    .split('/')
                    .filter(|form| !form.trim().is_empty())
                    .collect(),
                "Exchanges",
            ),
        };

        if segments.is_empty() {
            return Ok(vec![ResultItem::no_results(word)]);
        }

        Ok(segments
            .into_iter()
            .map(|segment| run.present.info(segment, label, &entry.key))
            .collect())
    }

    /// Synonyms that exist in the dictionary, as word rows
    async fn synonyms_only(&self, word: &str, run: &Run<'_>) -> Result<Vec<ResultItem>, LookupError> {
        run.ensure_live()?;
        let synonyms = run.guarded(self.synonyms.synonyms(word)).await?;
        tracing::debug!("{} synonyms for '{}'", synonyms.len(), word);

        run.ensure_live()?;
        let wanted = synonyms.clone();
        let mut entries = run
            .blocking(&self.store, move |store| store.get_many(&wanted))
            .await??;
        entries.sort_by_key(|entry| {
            synonyms
                .iter()
                .position(|syn| syn.eq_ignore_ascii_case(&entry.key))
                .unwrap_or(usize::MAX)
        });

        if entries.is_empty() {
            return Ok(vec![ResultItem::no_results(word)]);
        }
        Ok(entries.iter().map(|entry| run.present.word(entry)).collect())
    }

    /// Remote translations, each opening the detailed view of itself
    async fn cross_language(&self, word: &str, run: &Run<'_>) -> Result<Vec<ResultItem>, LookupError> {
        run.ensure_live()?;
        let translations = run.guarded(self.translations.translations(word)).await?;

        if translations.is_empty() {
            return Ok(vec![ResultItem::no_results(word)]);
        }

        Ok(translations
            .iter()
            .map(|translation| {
                ResultItem::new(
                    translation.clone(),
                    word,
                    run.present.pivot(translation, RetrievalMode::Detailed),
                )
            })
            .collect())
    }
}
