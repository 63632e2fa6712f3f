mod event_flow_tests;

use std::path::Path;
use std::sync::Arc;

use cidian_bootstrap::BootstrapManager;
use cidian_config::download::DownloadConfig;
use cidian_core::{CorrectionOracle, Entry, LookupEngine, LookupOptions, LookupStore, MemoryStore, Suggestion};
use cidian_translator::Disabled;

use crate::session::Session;

pub struct NoCorrections;

impl CorrectionOracle for NoCorrections {
    fn correct(&self, _token: &str) -> Vec<Suggestion> {
        Vec::new()
    }
}

pub fn entry(key: &str, phonetic: &str, translation: &str) -> Entry {
    Entry {
        key: key.to_string(),
        phonetic: phonetic.to_string(),
        translation: translation.to_string(),
        ..Default::default()
    }
}

pub fn words() -> MemoryStore {
    MemoryStore::with_entries([
        (entry("apple", "'æpl", "n. 苹果"), 1),
        (entry("banana", "bə'nɑ:nə", "n. 香蕉"), 2),
    ])
}

/// Download settings that fail fast without touching the network
pub fn offline() -> DownloadConfig {
    DownloadConfig {
        primary_url: "http://127.0.0.1:9/primary.zip".to_string(),
        mirror_url: "http://127.0.0.1:9/mirror.zip".to_string(),
        probe_url: "http://127.0.0.1:9/generate_204".to_string(),
        probe_timeout_ms: 200,
    }
}

pub fn session_with(
    store: impl LookupStore + 'static,
    dataset: &Path,
    keyword: &str,
    options: LookupOptions,
) -> Arc<Session> {
    let engine = LookupEngine::new(
        Arc::new(store),
        Arc::new(NoCorrections),
        Arc::new(Disabled),
        Arc::new(Disabled),
        options,
    );
    let bootstrap = Arc::new(BootstrapManager::new(dataset, offline()).unwrap());
    Arc::new(Session::new(engine, bootstrap, keyword))
}

/// Session over [`words`] with a dataset file that exists
pub fn ready_session(dir: &Path, keyword: &str, options: LookupOptions) -> Arc<Session> {
    let dataset = dir.join("ecdict.db");
    std::fs::write(&dataset, b"").unwrap();
    session_with(words(), &dataset, keyword, options)
}
