//! Configuration management

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::download::DownloadConfig;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Service list fetched when no source is given
    #[serde(default)]
    pub service_list_url: String,
    #[serde(default = "default_lang")]
    pub preferred_lang: String,
    /// DRM system ids the player can handle; empty disables the filter
    #[serde(default)]
    pub supported_drm: Vec<String>,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub region_id: String,
    #[serde(default)]
    pub user_agent: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

fn default_lang() -> String { "en".to_string() }
fn default_timeout() -> u64 { 120 }
fn default_retries() -> u32 { 3 }

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service_list_url: String::new(),
            preferred_lang: default_lang(),
            supported_drm: Vec::new(),
            postcode: String::new(),
            region_id: String::new(),
            user_agent: String::new(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
        }
    }
}

impl ClientConfig {
    pub fn config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("dvbi_catalogue");
        path.push("config.json");
        path
    }

    /// Load from the default location, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            if let Ok(content) = fs::read_to_string(path) {
                match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => log::warn!("Ignoring unreadable config {}: {}", path.display(), e),
                }
            }
        }

        Self::default()
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn download_config(&self) -> DownloadConfig {
        let mut config = DownloadConfig {
            read_timeout_secs: self.timeout_secs,
            max_retries: self.max_retries,
            ..Default::default()
        };
        if !self.user_agent.is_empty() {
            config.user_agent = self.user_agent.clone();
        }
        config
    }
}
