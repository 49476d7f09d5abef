mod api;
mod defaults;
mod widget;

use crate::cli::Args;
use crate::widget::WidgetSettings;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

pub use api::ApiConfig;
pub use defaults::parse_flag;
pub use widget::{SessionConfig, StorageConfig, WidgetConfig};

/// Resolved settings for one run of the widget.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub auto_open: bool,
    pub open_delay_ms: u64,
    /// `None` means the platform data directory
    pub storage_dir: Option<PathBuf>,
    pub verbose: bool,
}

/// On-disk configuration, every field optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FileConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub widget: WidgetConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    /// CLI args > environment > config file > defaults.
    pub fn from_env_and_args(args: &Args) -> Result<Self> {
        let file_config = FileConfig::load()?;
        Ok(Self::resolve(args, &file_config, |key| env::var(key).ok()))
    }

    /// Merge the layers with an explicit environment lookup.
    pub fn resolve(
        args: &Args,
        file_config: &FileConfig,
        env_var: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let base_url = args
            .base_url
            .clone()
            .or_else(|| env_var("SCOUT_API_BASE_URL"))
            .or(file_config.api.base_url.clone())
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(defaults::default_base_url);

        let auto_open = if args.no_auto_open {
            false
        } else {
            env_var("SCOUT_AUTO_OPEN")
                .and_then(|v| parse_flag(&v))
                .or(file_config.widget.auto_open)
                .unwrap_or_else(defaults::default_auto_open)
        };

        let open_delay_ms = args
            .open_delay_ms
            .or_else(|| env_var("SCOUT_OPEN_DELAY_MS").and_then(|s| s.parse::<u64>().ok()))
            .or(file_config.widget.open_delay_ms)
            .unwrap_or_else(defaults::default_open_delay_ms);

        let storage_dir = args
            .storage_dir
            .clone()
            .or_else(|| env_var("SCOUT_STORAGE_DIR").map(PathBuf::from))
            .or(file_config.storage.dir.clone().map(PathBuf::from));

        let verbose = args.verbose
            || env_var("SCOUT_VERBOSE")
                .and_then(|v| parse_flag(&v))
                .or(file_config.session.verbose)
                .unwrap_or_else(defaults::default_verbose);

        Config {
            base_url,
            auto_open,
            open_delay_ms,
            storage_dir,
            verbose,
        }
    }

    pub fn widget_settings(&self) -> WidgetSettings {
        WidgetSettings {
            verbose: self.verbose,
            auto_open: self.auto_open,
            open_delay: Duration::from_millis(self.open_delay_ms),
        }
    }
}

impl FileConfig {
    pub fn load() -> Result<Self> {
        for path in Self::get_config_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        // No config file found, return default
        Ok(FileConfig::default())
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );

        if is_yaml {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config file: {}", path.display()))
        } else {
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config file: {}", path.display()))
        }
    }

    pub fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".scout.yaml"),
            PathBuf::from(".scout.yml"),
            PathBuf::from(".scout.json"),
        ];

        if let Some(config_dir) = Self::user_config_dir() {
            paths.push(config_dir.join("scout.yaml"));
            paths.push(config_dir.join("scout.yml"));
            paths.push(config_dir.join("scout.json"));
        }

        paths
    }

    fn user_config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join("scout"))
    }

    pub fn example() -> Self {
        FileConfig {
            api: ApiConfig {
                base_url: Some(defaults::default_base_url()),
            },
            widget: WidgetConfig {
                auto_open: Some(defaults::default_auto_open()),
                open_delay_ms: Some(defaults::default_open_delay_ms()),
            },
            storage: StorageConfig { dir: None },
            session: SessionConfig {
                verbose: Some(defaults::default_verbose()),
            },
        }
    }

    /// Write the example config to the user config directory, refusing to overwrite.
    pub fn init_user_config() -> Result<PathBuf> {
        let config_dir = Self::user_config_dir().context("Could not determine home directory")?;
        let path = config_dir.join("scout.yaml");
        if path.exists() {
            anyhow::bail!("Config file already exists: {}", path.display());
        }

        fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create {}", config_dir.display()))?;
        let yaml = serde_yaml::to_string(&Self::example())?;
        fs::write(&path, yaml).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}
