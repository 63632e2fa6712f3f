use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_path() -> PathBuf {
    PathBuf::from("dicts/ecdict.db")
}

fn default_frequency_path() -> PathBuf {
    PathBuf::from("dicts/frequency_dictionary_en_82_765.txt")
}

fn default_max_edit_distance() -> i64 {
    3
}

fn default_prefix_limit() -> usize {
    20
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DictionaryConfig {
    /// SQLite dataset file
    #[serde(default = "default_path")]
    pub path: PathBuf,
    /// Word frequency list feeding the correction oracle
    #[serde(default = "default_frequency_path")]
    pub frequency_path: PathBuf,
    #[serde(default = "default_max_edit_distance")]
    pub max_edit_distance: i64,
    /// Cap on prefix matches per query
    #[serde(default = "default_prefix_limit")]
    pub prefix_limit: usize,
    /// Show English definitions instead of translations in word rows
    #[serde(default)]
    pub show_english_definition: bool,
    /// Url template opened for a word, `{}` is replaced by the word
    #[serde(default)]
    pub word_website: String,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            frequency_path: default_frequency_path(),
            max_edit_distance: default_max_edit_distance(),
            prefix_limit: default_prefix_limit(),
            show_english_definition: false,
            word_website: String::new(),
        }
    }
}

impl DictionaryConfig {
    pub fn new() -> Self {
        let mut config = Self::default();

        if let Ok(path) = env::var("CIDIAN_DICT_PATH") {
            config.path = PathBuf::from(path);
        }
        if let Ok(path) = env::var("CIDIAN_FREQUENCY_PATH") {
            config.frequency_path = PathBuf::from(path);
        }
        config.max_edit_distance = env::var("CIDIAN_MAX_EDIT_DISTANCE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(config.max_edit_distance);

        config
    }
}
