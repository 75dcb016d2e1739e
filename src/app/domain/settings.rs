use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::app::infrastructure::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Re-render the preview after a quiet period following each edit.
    #[serde(default = "default_auto_reload")]
    pub auto_reload: bool,

    #[serde(default = "default_reload_delay_ms")]
    pub reload_delay_ms: u64,

    #[serde(default = "default_save_delay_ms")]
    pub save_delay_ms: u64,

    #[serde(default = "default_periodic_save_secs")]
    pub periodic_save_secs: u64,

    #[serde(default = "default_highlighting")]
    pub highlighting_enabled: bool,

    #[serde(default = "default_font_size")]
    pub font_size: u32,

    #[serde(default)]
    pub dark_mode: bool,

    /// Where exported files land. Falls back to the platform download dir.
    #[serde(default)]
    pub download_dir: Option<String>,
}

fn default_auto_reload() -> bool {
    true
}

fn default_reload_delay_ms() -> u64 {
    1000
}

fn default_save_delay_ms() -> u64 {
    2000
}

fn default_periodic_save_secs() -> u64 {
    30
}

fn default_highlighting() -> bool {
    true
}

fn default_font_size() -> u32 {
    14
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            auto_reload: default_auto_reload(),
            reload_delay_ms: default_reload_delay_ms(),
            save_delay_ms: default_save_delay_ms(),
            periodic_save_secs: default_periodic_save_secs(),
            highlighting_enabled: default_highlighting(),
            font_size: default_font_size(),
            dark_mode: false,
            download_dir: None,
        }
    }
}

impl AppSettings {
    /// Load settings from disk, or create default if not exists
    pub fn load() -> Self {
        let config_path = Self::get_config_path();

        match fs::read_to_string(&config_path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!("Failed to parse settings: {}. Using defaults.", e);
                    Self::default()
                }
            },
            Err(_) => {
                let default = Self::default();
                if let Err(e) = default.save() {
                    tracing::debug!("Could not write default settings: {}", e);
                }
                default
            }
        }
    }

    /// Save settings to disk
    pub fn save(&self) -> Result<(), AppError> {
        let config_path = Self::get_config_path();

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, json)?;

        Ok(())
    }

    /// Get config file path (cross-platform)
    pub fn get_config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("ferrisplay");
        path.push("settings.json");
        path
    }

    /// Directory exported project files are written to.
    pub fn resolved_download_dir(&self) -> PathBuf {
        match &self.download_dir {
            Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}
