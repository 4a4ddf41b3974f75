use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Port the worker listens on when nothing else is configured.
pub const DEFAULT_WORKER_PORT: u16 = 37777;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BridgeConfig {
    pub worker: WorkerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WorkerConfig {
    pub url: String,
    pub timeout_ms: u64,
    pub health_timeout_ms: u64,
    pub ready_timeout_ms: u64,
    pub poll_interval_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            worker: WorkerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            url: format!("http://127.0.0.1:{DEFAULT_WORKER_PORT}"),
            timeout_ms: 30_000,
            health_timeout_ms: 5_000,
            ready_timeout_ms: 30_000,
            poll_interval_ms: 500,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl WorkerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_millis(self.health_timeout_ms)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Returns `~/.membridge/`
pub fn default_membridge_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".membridge"))
}

/// Returns the default config file path: `~/.membridge/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    default_membridge_dir().map(|dir| dir.join("config.toml"))
}

impl BridgeConfig {
    /// Load config from the default TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        match default_config_path() {
            Some(path) => Self::load_from(path),
            None => {
                info!("no home directory, using default config");
                let mut config = BridgeConfig::default();
                config.apply_env_overrides();
                Ok(config)
            }
        }
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            BridgeConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    /// (MEMBRIDGE_WORKER_URL, MEMBRIDGE_WORKER_PORT, MEMBRIDGE_LOG_LEVEL).
    ///
    /// A port override wins over a URL override.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("MEMBRIDGE_WORKER_URL") {
            self.worker.url = val;
        }
        if let Ok(val) = std::env::var("MEMBRIDGE_WORKER_PORT") {
            match val.parse::<u16>() {
                Ok(port) => self.worker.url = format!("http://127.0.0.1:{port}"),
                Err(_) => tracing::warn!(value = %val, "ignoring invalid MEMBRIDGE_WORKER_PORT"),
            }
        }
        if let Ok(val) = std::env::var("MEMBRIDGE_LOG_LEVEL") {
            self.logging.level = val;
        }
    }
}
