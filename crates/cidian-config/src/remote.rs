use std::env;

use serde::{Deserialize, Serialize};

fn default_synonyms_url() -> String {
    "http://words.bighugelabs.com/api/2".to_string()
}

fn default_iciba_url() -> String {
    "http://dict-co.iciba.com/api/dictionary.php".to_string()
}

fn default_iciba_token() -> String {
    "BEBC0A981CB63ED5198597D732BD8956".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

/// Remote synonym and translation services
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct RemoteConfig {
    #[serde(default)]
    pub bighugelabs_token: String,
    #[serde(default = "default_synonyms_url")]
    pub synonyms_url: String,
    #[serde(default = "default_iciba_token")]
    pub iciba_token: String,
    #[serde(default = "default_iciba_url")]
    pub iciba_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            bighugelabs_token: String::new(),
            synonyms_url: default_synonyms_url(),
            iciba_token: default_iciba_token(),
            iciba_url: default_iciba_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl RemoteConfig {
    pub fn new() -> Self {
        let mut config = Self::default();

        if let Ok(token) = env::var("BIGHUGELABS_TOKEN") {
            config.bighugelabs_token = token;
        }
        if let Ok(token) = env::var("ICIBA_TOKEN") {
            config.iciba_token = token;
        }
        config.timeout_seconds = env::var("REMOTE_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(config.timeout_seconds);

        config
    }
}
