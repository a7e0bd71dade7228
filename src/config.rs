use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub const MIN_SMOOTHING_WINDOW: usize = 1;
pub const MAX_SMOOTHING_WINDOW: usize = 50;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_user")]
    pub default_user: String,
    /// Number of live WPM samples averaged on the typing screen.
    #[serde(default = "default_wpm_smoothing_window")]
    pub wpm_smoothing_window: usize,
    /// `tracing` filter directive; `RUST_LOG` wins when set.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default)]
    pub drills_path: Option<PathBuf>,
}

fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_user() -> String {
    std::env::var("USER")
        .ok()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "player".to_string())
}
fn default_wpm_smoothing_window() -> usize {
    5
}
fn default_log_filter() -> String {
    "tierdrill=info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            default_user: default_user(),
            wpm_smoothing_window: default_wpm_smoothing_window(),
            log_filter: default_log_filter(),
            drills_path: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tierdrill")
    }

    fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Clamp out-of-range values left by hand-edited files.
    pub fn validate(&mut self) {
        self.wpm_smoothing_window = self
            .wpm_smoothing_window
            .clamp(MIN_SMOOTHING_WINDOW, MAX_SMOOTHING_WINDOW);
        if self.default_user.trim().is_empty() {
            self.default_user = default_user();
        }
        if self.log_filter.trim().is_empty() {
            self.log_filter = default_log_filter();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.theme, "catppuccin-mocha");
        assert_eq!(config.wpm_smoothing_window, 5);
        assert_eq!(config.log_filter, "tierdrill=info");
        assert!(config.drills_path.is_none());
        assert!(!config.default_user.is_empty());
    }

    #[test]
    fn test_config_partial_file_keeps_other_defaults() {
        let toml_str = r#"
theme = "gruvbox-dark"
drills_path = "/tmp/my-drills.json"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.theme, "gruvbox-dark");
        assert_eq!(config.drills_path, Some(PathBuf::from("/tmp/my-drills.json")));
        assert_eq!(config.wpm_smoothing_window, 5);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let mut config = Config::default();
        config.drills_path = Some(PathBuf::from("drills.json"));
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_validate_clamps_smoothing_window() {
        let mut config = Config::default();
        config.wpm_smoothing_window = 0;
        config.validate();
        assert_eq!(config.wpm_smoothing_window, 1);

        config.wpm_smoothing_window = 999;
        config.validate();
        assert_eq!(config.wpm_smoothing_window, 50);
    }

    #[test]
    fn test_validate_restores_blank_strings() {
        let mut config = Config::default();
        config.default_user = "  ".to_string();
        config.log_filter = String::new();
        config.validate();
        assert!(!config.default_user.trim().is_empty());
        assert_eq!(config.log_filter, "tierdrill=info");
    }
}
