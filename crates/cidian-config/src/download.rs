use serde::{Deserialize, Serialize};

const ARCHIVE_PATH: &str = "skywind3000/ECDICT-ultimate/releases/download/1.0.0/ecdict-ultimate-sqlite.zip";

fn default_primary_url() -> String {
    format!("https://github.com/{ARCHIVE_PATH}")
}

fn default_mirror_url() -> String {
    format!("https://download.fastgit.org/{ARCHIVE_PATH}")
}

fn default_probe_url() -> String {
    "https://google.com/generate_204".to_string()
}

fn default_probe_timeout_ms() -> u64 {
    2000
}

/// Where and how the dataset archive is fetched
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DownloadConfig {
    #[serde(default = "default_primary_url")]
    pub primary_url: String,
    /// Used when the connectivity probe fails
    #[serde(default = "default_mirror_url")]
    pub mirror_url: String,
    #[serde(default = "default_probe_url")]
    pub probe_url: String,
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            primary_url: default_primary_url(),
            mirror_url: default_mirror_url(),
            probe_url: default_probe_url(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}
