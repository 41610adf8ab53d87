use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::theme::{StyleMap, ThemeName};
use crate::verbosity::Verbosity;

/// Construction-time configuration for [`ConsoleUtils`](crate::ConsoleUtils).
///
/// Can be built in code or loaded from a `prettiprint.{toml,json,yaml,yml}`
/// file. Keys are kebab-case in files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsoleConfig {
    /// Preset theme name
    #[serde(default)]
    pub theme: ThemeName,

    /// Prefix messages with emoji icons
    #[serde(default = "default_true")]
    pub emoji: bool,

    /// Prefix events with a local timestamp
    #[serde(default = "default_true")]
    pub timestamps: bool,

    /// Output verbosity (0-3)
    #[serde(default)]
    pub verbosity: Verbosity,

    /// Show the full cause chain when printing errors
    #[serde(default = "default_true")]
    pub enable_tracebacks: bool,

    /// Style overrides merged on top of the theme preset
    #[serde(default, skip_serializing_if = "StyleMap::is_empty")]
    pub custom_styles: StyleMap,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            theme: ThemeName::Dark,
            emoji: true,
            timestamps: true,
            verbosity: Verbosity::NORMAL,
            enable_tracebacks: true,
            custom_styles: StyleMap::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

const CANDIDATES: [&str; 4] = [
    "prettiprint.toml",
    "prettiprint.json",
    "prettiprint.yaml",
    "prettiprint.yml",
];

impl ConsoleConfig {
    pub fn with_theme(mut self, theme: ThemeName) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_emoji(mut self, emoji: bool) -> Self {
        self.emoji = emoji;
        self
    }

    pub fn with_timestamps(mut self, timestamps: bool) -> Self {
        self.timestamps = timestamps;
        self
    }

    pub fn with_tracebacks(mut self, enable: bool) -> Self {
        self.enable_tracebacks = enable;
        self
    }

    pub fn with_style(mut self, key: impl Into<String>, descriptor: impl Into<String>) -> Self {
        self.custom_styles.insert(key, descriptor);
        self
    }

    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./prettiprint.toml
    /// 3. ./prettiprint.json
    /// 4. ./prettiprint.yaml
    /// 5. ./prettiprint.yml
    /// 6. `<user config dir>/prettiprint/config.toml`
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            if path.exists() {
                return Self::load_from_path(path);
            }
            log::debug!("config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        for candidate in &CANDIDATES {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        if let Some(path) = user_config_path() {
            if path.exists() {
                return Self::load_from_path(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        log::debug!("loading console config from {}", path.display());

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        let parsed = match extension {
            "toml" => toml::from_str(&contents).map_err(|e| e.to_string()),
            "json" => serde_json::from_str(&contents).map_err(|e| e.to_string()),
            "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| e.to_string()),
            _ => {
                // Try TOML first, then JSON, then YAML
                toml::from_str(&contents)
                    .map_err(|e| e.to_string())
                    .or_else(|_| serde_json::from_str(&contents).map_err(|e| e.to_string()))
                    .or_else(|_| serde_yaml::from_str(&contents).map_err(|e| e.to_string()))
            }
        };

        parsed.map_err(|message| Error::ConfigFile {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Save configuration to a file, choosing the format by extension.
    pub fn save(&self, path: &Path) -> Result<()> {
        let encoded = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::to_string_pretty(self).map_err(|e| e.to_string()),
            Some("yaml") | Some("yml") => serde_yaml::to_string(self).map_err(|e| e.to_string()),
            _ => toml::to_string_pretty(self).map_err(|e| e.to_string()),
        };
        let contents = encoded.map_err(|message| Error::ConfigFile {
            path: path.to_path_buf(),
            message,
        })?;

        std::fs::write(path, contents)?;
        Ok(())
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("prettiprint").join("config.toml"))
}
