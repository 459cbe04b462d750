use std::path::PathBuf;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

use super::alerts::engine::AlertEngineConfig;
use super::notifier::{NotifierOptions, TagPolicy};

/// Application settings with alert configuration.
/// Missing fields in an older settings.json fall back to defaults.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the price-tracking backend, without the `/api` suffix
    pub backend_url: String,
    pub request_timeout_seconds: u64,
    pub notifications_enabled: bool,
    /// Fallback close delay for notifications that do not need interaction
    pub auto_close_seconds: u64,
    pub tag_policy: TagPolicy,
    /// Alert system configuration
    pub alert_settings: AlertEngineConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8080".to_string(),
            request_timeout_seconds: 30,
            notifications_enabled: true,
            auto_close_seconds: 5,
            tag_policy: TagPolicy::SingleSlot,
            alert_settings: AlertEngineConfig::default_enabled(),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn notifier_options(&self) -> NotifierOptions {
        NotifierOptions {
            enabled: self.notifications_enabled,
            auto_close: Duration::from_secs(self.auto_close_seconds),
            tag_policy: self.tag_policy,
        }
    }
}

pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(app_config_dir: PathBuf) -> Self {
        Self {
            config_path: app_config_dir.join("settings.json"),
        }
    }

    pub fn load(&self) -> Settings {
        if !self.config_path.exists() {
            return Settings::default();
        }
        match fs::read_to_string(&self.config_path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!("Ignoring unreadable settings {:?}: {}", self.config_path, e);
                Settings::default()
            }),
            Err(e) => {
                log::warn!("Could not read settings {:?}: {}", self.config_path, e);
                Settings::default()
            }
        }
    }

    pub fn save(&self, settings: &Settings) -> io::Result<()> {
        // Ensure directory exists
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.config_path, content)
    }
}
