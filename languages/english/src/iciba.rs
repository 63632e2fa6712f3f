use std::time::Duration;

use async_trait::async_trait;
use cidian_translator::{ProviderMetadata, RemoteError, TranslationProvider};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ServerResponse {
    #[serde(default)]
    symbols: Option<Vec<Symbol>>,
}

#[derive(Debug, Deserialize)]
struct Symbol {
    #[serde(default)]
    parts: Option<Vec<Part>>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    means: Option<Vec<Mean>>,
}

/// Chinese lookups return objects, English lookups bare strings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Mean {
    Detailed { word_mean: String },
    Plain(String),
}

impl Mean {
    fn into_text(self) -> String {
        match self {
            Mean::Detailed { word_mean } => word_mean,
            Mean::Plain(text) => text,
        }
    }
}

/// iCIBA dictionary API, used for Chinese to English lookups
#[derive(Clone)]
pub struct IcibaTranslator {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
}

impl IcibaTranslator {
    pub fn new(api_key: String, api_url: String, timeout: Duration) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            api_url,
        })
    }

    pub async fn fetch(&self, word: &str) -> Result<Vec<String>, RemoteError> {
        if self.api_key.is_empty() {
            return Err(RemoteError::AuthenticationError);
        }

        let params = [("w", word), ("key", self.api_key.as_str()), ("type", "json")];
        let response = self.client.get(&self.api_url).query(&params).send().await?;

        if !response.status().is_success() {
            return Err(RemoteError::Status(response.status()));
        }

        let body = response.text().await?;
        let rsp: ServerResponse = serde_json::from_str(&body)
            .map_err(|e| RemoteError::ApiError(format!("Failed to parse response: {}", e)))?;

        Ok(rsp
            .symbols
            .into_iter()
            .flatten()
            .flat_map(|symbol| symbol.parts.into_iter().flatten())
            .flat_map(|part| part.means.into_iter().flatten())
            .map(Mean::into_text)
            .filter(|text| !text.trim().is_empty())
            .collect())
    }
}

#[async_trait]
impl TranslationProvider for IcibaTranslator {
    async fn translations(&self, word: &str) -> Vec<String> {
        self.fetch(word).await.unwrap_or_else(|e| {
            tracing::warn!("Translation lookup for '{}' failed: {}", word, e);
            Vec::new()
        })
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "iCIBA".to_string(),
            requires_api_key: true,
        }
    }
}
