use crate::dialog::OverlapPolicy;
use crate::error::DialogError;
use crate::log_debug;

use anyhow::{Context, Result, anyhow};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Ids of the page elements a confirmation dialog drives
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ElementIds {
    /// Panel shown while a confirmation is pending
    #[serde(default = "default_panel_id")]
    pub panel: String,
    /// Control that answers "yes"
    #[serde(default = "default_affirmative_id")]
    pub affirmative: String,
    /// Control that answers "no"
    #[serde(default = "default_negative_id")]
    pub negative: String,
    /// Region that receives the prompt text
    #[serde(default = "default_text_id")]
    pub text: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            panel: default_panel_id(),
            affirmative: default_affirmative_id(),
            negative: default_negative_id(),
            text: default_text_id(),
        }
    }
}

impl ElementIds {
    /// All ids in lookup order
    pub fn all(&self) -> [&str; 4] {
        [
            self.panel.as_str(),
            self.text.as_str(),
            self.affirmative.as_str(),
            self.negative.as_str(),
        ]
    }

    /// Every id must be non-empty and distinct from the others
    pub fn validate(&self) -> Result<(), DialogError> {
        let mut seen = HashSet::new();
        for id in self.all() {
            if id.trim().is_empty() {
                return Err(DialogError::InvalidConfig(
                    "element ids must not be empty".to_string(),
                ));
            }
            if !seen.insert(id) {
                return Err(DialogError::InvalidConfig(format!(
                    "element id '{id}' is used more than once"
                )));
            }
        }
        Ok(())
    }
}

fn default_panel_id() -> String {
    "confirm-modal".to_string()
}

fn default_affirmative_id() -> String {
    "confirm-yes".to_string()
}

fn default_negative_id() -> String {
    "confirm-no".to_string()
}

fn default_text_id() -> String {
    "modal-text".to_string()
}

/// Configuration for the confirmation dialog
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct DialogConfig {
    /// What a new request does to one that is still pending
    #[serde(default)]
    pub overlap: OverlapPolicy,
    /// Give up waiting after this many seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
    /// Element ids on the hosting page
    #[serde(default)]
    pub elements: ElementIds,
}

/// Directory name under the platform config dir
pub const CONFIG_DIR_NAME: &str = "confirm-dialog";

impl DialogConfig {
    /// Load the user configuration, falling back to defaults when no file exists
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            log_debug!("No configuration at {}, using defaults", config_path.display());
            Ok(Self::default())
        }
    }

    /// Load and validate a configuration file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml(&content).with_context(|| {
            format!(
                "Invalid configuration file format in {}. Please check it for syntax errors.",
                path.display()
            )
        })?;
        log_debug!("Configuration loaded: {:?}", config);
        Ok(config)
    }

    /// Parse and validate a configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.elements.validate()?;
        Ok(config)
    }

    /// Save the configuration to the user config file
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let config_content = toml::to_string_pretty(self)?;
        fs::write(path, config_content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        log_debug!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// How long to wait for an answer, if bounded
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    /// Get the path to the configuration file
    fn get_config_path() -> Result<PathBuf> {
        let mut path =
            config_dir().ok_or_else(|| anyhow!("Unable to determine config directory"))?;
        path.push(CONFIG_DIR_NAME);
        fs::create_dir_all(&path)?;
        path.push("config.toml");
        Ok(path)
    }
}
