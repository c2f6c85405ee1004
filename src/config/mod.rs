use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Prefix shared by every environment override
const ENV_PREFIX: &str = "SUSPEND_DIALOGS_";

/// Configuration loading and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Application configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Interval between UI ticks in milliseconds
    pub tick_rate_ms: u64,

    /// Whether mouse capture is enabled
    pub mouse_enabled: bool,

    /// Dim the screen underneath open dialogs
    pub dim_background: bool,

    /// Theme name (`dark` or `light`)
    pub theme: String,

    /// Data directory for the log file
    pub data_dir: PathBuf,

    /// Explicit log file path; defaults to `<data_dir>/suspend-dialogs.log`
    pub log_file: Option<PathBuf>,

    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub log_filter: String,

    /// Timings of the demo screen
    pub demo: DemoConfig,
}

/// Demo screen settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// How long the loading demo's work takes
    pub loading_delay_ms: u64,

    /// How long a confirmed manual dialog stays in its processing state
    pub processing_delay_ms: u64,

    /// How long a status message stays visible
    pub status_timeout_ms: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            loading_delay_ms: 3000,
            processing_delay_ms: 1000,
            status_timeout_ms: 2500,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_rate_ms: 100,
            mouse_enabled: true,
            dim_background: true,
            theme: "dark".to_string(),
            data_dir: dirs::data_local_dir()
                .map(|dir| dir.join("suspend-dialogs"))
                .unwrap_or_else(|| PathBuf::from("./data")),
            log_file: None,
            log_filter: "suspend_dialogs=info".to_string(),
            demo: DemoConfig::default(),
        }
    }
}

impl Config {
    /// Initialize configuration from a config file and the environment
    pub async fn init(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        debug!("Initializing configuration");

        let mut config = Self::load_from_file(explicit_path)
            .await?
            .unwrap_or_default();
        config.load_from_env();

        Ok(config)
    }

    /// Configuration files in priority order
    pub fn candidate_paths(explicit_path: Option<&Path>) -> Vec<PathBuf> {
        if let Some(path) = explicit_path {
            return vec![path.to_path_buf()];
        }

        let mut paths = vec![
            PathBuf::from("./.suspend-dialogs.json"),
            PathBuf::from("./suspend-dialogs.json"),
        ];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("suspend-dialogs").join("config.json"));
        }
        paths
    }

    /// Load the first configuration file found
    ///
    /// An explicitly given path must exist; the default locations are
    /// optional.
    pub async fn load_from_file(explicit_path: Option<&Path>) -> Result<Option<Self>, ConfigError> {
        for path in Self::candidate_paths(explicit_path) {
            if explicit_path.is_none() && !path.exists() {
                continue;
            }

            debug!("Loading configuration from: {}", path.display());
            let content = tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
            let config = serde_json::from_str(&content)
                .map_err(|source| ConfigError::Parse { path, source })?;
            return Ok(Some(config));
        }

        Ok(None)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(&mut self) {
        self.apply_env(|key| std::env::var(key).ok());
    }

    /// Apply `SUSPEND_DIALOGS_*` overrides from the given lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));
        let number = |name: &str| var(name).and_then(|value| value.trim().parse::<u64>().ok());
        let flag = |name: &str| {
            var(name).map(|value| matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
        };

        if let Some(tick_rate) = number("TICK_RATE_MS") {
            self.tick_rate_ms = tick_rate;
        }
        if let Some(mouse) = flag("MOUSE") {
            self.mouse_enabled = mouse;
        }
        if let Some(dim) = flag("DIM_BACKGROUND") {
            self.dim_background = dim;
        }
        if let Some(theme) = var("THEME") {
            self.theme = theme;
        }
        if let Some(data_dir) = var("DATA_DIR") {
            self.data_dir = PathBuf::from(data_dir);
        }
        if let Some(log_file) = var("LOG_FILE") {
            self.log_file = Some(PathBuf::from(log_file));
        }
        if let Some(filter) = var("LOG_FILTER") {
            self.log_filter = filter;
        }
        if let Some(delay) = number("LOADING_DELAY_MS") {
            self.demo.loading_delay_ms = delay;
        }
        if let Some(delay) = number("PROCESSING_DELAY_MS") {
            self.demo.processing_delay_ms = delay;
        }
        if let Some(timeout) = number("STATUS_TIMEOUT_MS") {
            self.demo.status_timeout_ms = timeout;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate_ms == 0 {
            return Err(ConfigError::Invalid(
                "tick_rate_ms must be greater than 0".to_string(),
            ));
        }

        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::Invalid("log_filter must not be empty".to_string()));
        }

        Ok(())
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }

    /// Where log output goes
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("suspend-dialogs.log"))
    }
}

impl DemoConfig {
    pub fn loading_delay(&self) -> Duration {
        Duration::from_millis(self.loading_delay_ms)
    }

    pub fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.processing_delay_ms)
    }

    pub fn status_timeout(&self) -> Duration {
        Duration::from_millis(self.status_timeout_ms)
    }
}
