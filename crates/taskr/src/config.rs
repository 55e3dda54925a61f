/*
[INPUT]:  Built-in defaults, optional YAML file, TASKR_* environment variables
[OUTPUT]: Validated application configuration
[POS]:    Configuration layer - client and storage setup
[UPDATE]: When adding new configuration options
*/

use anyhow::{Context, Result, anyhow, bail};
use config::{Config, Environment, File, FileFormat, Map};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use taskr_client::{ApiFlavor, ClientConfig, DEFAULT_BASE_URL};
use url::Url;

const ENV_PREFIX: &str = "TASKR";
const APP_DIR: &str = "taskr";

/// Top-level configuration for the TaskR client
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    /// Backend connection settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Where preferences, the offline table and logs live
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// How long a completed task can be undone
    #[serde(default = "default_undo_window_secs")]
    pub undo_window_secs: u64,
    /// Offline mirror settings
    #[serde(default)]
    pub offline: OfflineConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// `rest` for one script per call, `script` for the tasks.php layout
    #[serde(default)]
    pub flavor: ApiFlavor,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            flavor: ApiFlavor::default(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OfflineConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            data_dir: None,
            undo_window_secs: default_undo_window_secs(),
            offline: OfflineConfig::default(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_undo_window_secs() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Load configuration: defaults, then the YAML file, then `TASKR_*` variables.
    ///
    /// An explicit `path` must exist; the per-user default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    fn load_with_env(path: Option<&Path>, env: Option<Map<String, String>>) -> Result<Self> {
        let mut builder = Config::builder();

        match path {
            Some(path) => {
                builder = builder.add_source(
                    File::from(path.to_path_buf())
                        .format(FileFormat::Yaml)
                        .required(true),
                );
            }
            None => {
                if let Some(default_path) = default_config_path() {
                    builder = builder.add_source(
                        File::from(default_path)
                            .format(FileFormat::Yaml)
                            .required(false),
                    );
                }
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let settings = builder.build().context("read configuration")?;
        let config: Self = settings
            .try_deserialize()
            .context("parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the client cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.api.timeout_secs == 0 || self.api.connect_timeout_secs == 0 {
            bail!("api timeouts must be greater than zero");
        }
        let base = self.api.base_url.trim();
        if base.is_empty() {
            bail!("api.base_url cannot be empty");
        }
        let url = Url::parse(base)
            .with_context(|| format!("api.base_url '{base}' is not a valid URL"))?;
        match url.scheme() {
            "http" | "https" if url.has_host() => Ok(()),
            _ => bail!("api.base_url '{base}' is not an absolute http(s) URL"),
        }
    }

    /// HTTP client settings derived from this configuration
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api.base_url.clone(),
            flavor: self.api.flavor,
            timeout: Duration::from_secs(self.api.timeout_secs),
            connect_timeout: Duration::from_secs(self.api.connect_timeout_secs),
        }
    }

    pub fn undo_window(&self) -> Duration {
        Duration::from_secs(self.undo_window_secs)
    }

    /// Resolved data directory (configured, else the platform data dir)
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(dirs::data_dir()
                .ok_or_else(|| anyhow!("Could not determine data directory"))?
                .join(APP_DIR)),
        }
    }

    /// Serialize for writing a config file
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("failed to serialize config to YAML")
    }
}

/// `<config dir>/taskr/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.yaml"))
}
