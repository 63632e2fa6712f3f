use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use self::dictionary::DictionaryConfig;
use self::download::DownloadConfig;
use self::remote::RemoteConfig;

pub mod dictionary;
pub mod download;
pub mod remote;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dictionary: DictionaryConfig,
    pub download: DownloadConfig,
    pub remote: RemoteConfig,

    /// Keyword prefixed to every query an item action rewrites
    pub action_keyword: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dictionary: DictionaryConfig::default(),
            download: DownloadConfig::default(),
            remote: RemoteConfig::default(),
            action_keyword: String::new(),
        }
    }
}

impl Config {
    /// Defaults with environment overrides
    pub fn new() -> Self {
        let action_keyword = env::var("CIDIAN_ACTION_KEYWORD").unwrap_or_default();

        Config {
            dictionary: DictionaryConfig::new(),
            download: DownloadConfig::default(),
            remote: RemoteConfig::new(),
            action_keyword,
        }
    }

    /// Load a JSON config file, missing fields fall back to defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_json::from_reader(reader)?;
        Ok(config)
    }
}
