use std::sync::Arc;
use std::time::Duration;

use cidian_bootstrap::BootstrapManager;
use cidian_config::Config;
use cidian_core::{CorrectionOracle, LookupEngine, LookupOptions};
use cidian_lang_english::{BigHugeLabsSynonyms, Ecdict, IcibaTranslator, SymSpellOracle};
use cidian_translator::{Disabled, ProviderMetadata, SynonymProvider, TranslationProvider};

use crate::session::Session;

pub struct AppState {
    pub config: Config,
    pub session: Arc<Session>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let dict = &config.dictionary;
        let remote = &config.remote;
        let timeout = Duration::from_secs(remote.timeout_seconds);

        let store = Arc::new(Ecdict::new(dict.path.clone()));

        let oracle: Arc<dyn CorrectionOracle> =
            match SymSpellOracle::from_file(&dict.frequency_path, dict.max_edit_distance) {
                Ok(oracle) => Arc::new(oracle),
                Err(e) => {
                    tracing::warn!("Spelling correction disabled: {}", e);
                    Arc::new(SymSpellOracle::new(dict.max_edit_distance)?)
                }
            };

        let synonyms: Arc<dyn SynonymProvider> = if remote.bighugelabs_token.is_empty() {
            tracing::info!("No synonyms token, synonyms disabled");
            Arc::new(Disabled)
        } else {
            Arc::new(BigHugeLabsSynonyms::new(
                remote.bighugelabs_token.clone(),
                remote.synonyms_url.clone(),
                timeout,
            )?)
        };

        let translations: Arc<dyn TranslationProvider> = if remote.iciba_token.is_empty() {
            tracing::info!("No translation token, cross-language lookup disabled");
            Arc::new(Disabled)
        } else {
            Arc::new(IcibaTranslator::new(
                remote.iciba_token.clone(),
                remote.iciba_url.clone(),
                timeout,
            )?)
        };

        tracing::info!(
            "Providers: {}",
            describe_providers(synonyms.as_ref(), translations.as_ref())
        );

        let options = LookupOptions {
            prefix_limit: dict.prefix_limit,
            show_english_definition: dict.show_english_definition,
            word_website: dict.word_website.clone(),
        };
        let engine = LookupEngine::new(store, oracle, synonyms, translations, options);

        let bootstrap = Arc::new(BootstrapManager::new(dict.path.clone(), config.download.clone())?);
        if bootstrap.needs_bootstrap() {
            tracing::warn!("Dictionary not found at {}", dict.path.display());
        }

        let session = Arc::new(Session::new(engine, bootstrap, &config.action_keyword));

        Ok(Self { config, session })
    }
}

/// One line naming the enrichment providers in use
pub fn describe_providers(synonyms: &dyn SynonymProvider, translations: &dyn TranslationProvider) -> String {
    let label = |meta: ProviderMetadata| {
        if meta.requires_api_key {
            format!("{} (keyed)", meta.name)
        } else {
            meta.name
        }
    };
    format!(
        "synonyms: {}, translations: {}",
        label(synonyms.metadata()),
        label(translations.metadata())
    )
}
