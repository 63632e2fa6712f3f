/// Synonym provider interface
///
/// Implementations swallow their own failures: a provider that cannot reach
/// its service returns an empty list and logs the reason.
#[async_trait::async_trait]
pub trait SynonymProvider: Send + Sync {
    /// Synonyms of an English word, best first
    async fn synonyms(&self, word: &str) -> Vec<String>;

    /// Provider metadata
    fn metadata(&self) -> ProviderMetadata;
}

/// Cross-language translation provider interface
#[async_trait::async_trait]
pub trait TranslationProvider: Send + Sync {
    /// English renderings of a (usually Chinese) word
    async fn translations(&self, word: &str) -> Vec<String>;

    /// Provider metadata
    fn metadata(&self) -> ProviderMetadata;
}

#[derive(Debug, Clone)]
pub struct ProviderMetadata {
    pub name: String,
    pub requires_api_key: bool,
}

/// Providers that are not configured
pub struct Disabled;

#[async_trait::async_trait]
impl SynonymProvider for Disabled {
    async fn synonyms(&self, _word: &str) -> Vec<String> {
        Vec::new()
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "disabled".to_string(),
            requires_api_key: false,
        }
    }
}

#[async_trait::async_trait]
impl TranslationProvider for Disabled {
    async fn translations(&self, _word: &str) -> Vec<String> {
        Vec::new()
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "disabled".to_string(),
            requires_api_key: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Missing API key")]
    AuthenticationError,
}
