use std::time::Duration;

use async_trait::async_trait;
use cidian_translator::{ProviderMetadata, RemoteError, SynonymProvider};
use reqwest::{StatusCode, Url};

/// Big Huge Thesaurus client (`/api/2/{key}/{word}/`, plain text format)
#[derive(Clone)]
pub struct BigHugeLabsSynonyms {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
}

impl BigHugeLabsSynonyms {
    pub fn new(api_key: String, api_url: String, timeout: Duration) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            api_url,
        })
    }

    fn endpoint(&self, word: &str) -> Result<Url, RemoteError> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| RemoteError::ApiError(format!("Bad synonyms url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| RemoteError::ApiError("Synonyms url cannot take a path".to_string()))?
            .pop_if_empty()
            .push(&self.api_key)
            .push(word)
            .push("");
        Ok(url)
    }

    pub async fn fetch(&self, word: &str) -> Result<Vec<String>, RemoteError> {
        if self.api_key.is_empty() {
            return Err(RemoteError::AuthenticationError);
        }

        let response = self.client.get(self.endpoint(word)?).send().await?;

        match response.status() {
            // The service answers 404 for words it has nothing on
            StatusCode::NOT_FOUND => return Ok(Vec::new()),
            StatusCode::TOO_MANY_REQUESTS => return Err(RemoteError::RateLimitExceeded),
            status if !status.is_success() => return Err(RemoteError::Status(status)),
            _ => {}
        }

        let body = response.text().await?;
        Ok(parse_synonyms(&body))
    }
}

/// Lines look like `adjective|syn|glad`; only `syn` relations count
fn parse_synonyms(body: &str) -> Vec<String> {
    body.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let parts: Vec<&str> = line.split('|').collect();
            (parts.len() > 2 && parts[1] == "syn").then(|| parts[2].to_string())
        })
        .collect()
}

#[async_trait]
impl SynonymProvider for BigHugeLabsSynonyms {
    async fn synonyms(&self, word: &str) -> Vec<String> {
        match self.fetch(word).await {
            Ok(synonyms) => synonyms,
            Err(RemoteError::AuthenticationError) => {
                tracing::debug!("No thesaurus key configured, skipping synonyms");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("Synonym lookup for '{}' failed: {}", word, e);
                Vec::new()
            }
        }
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "Big Huge Thesaurus".to_string(),
            requires_api_key: true,
        }
    }
}
