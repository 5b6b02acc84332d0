//! Settings — TOML file with backend, session, default-config and overlay sections.
//!
//! Every section is optional. A missing file yields defaults; a file that exists
//! but does not parse is an error. `MACDSCOPE_BACKEND_URL` overrides
//! `backend.base_url`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use macdscope_core::domain::{ConfigError, ConfigModel};
use macdscope_core::{OverlayOptions, ResultStore, SequencePolicy};

use crate::gateway::DEFAULT_TIMEZONE;
use crate::transport::{HttpTransport, TransportError};

pub const BACKEND_URL_ENV: &str = "MACDSCOPE_BACKEND_URL";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot encode settings: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("invalid [defaults]: {0}")]
    InvalidDefaults(#[from] ConfigError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 30,
        }
    }
}

impl BackendSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn transport(&self) -> Result<HttpTransport, TransportError> {
        HttpTransport::new(&self.base_url, self.timeout())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub timezone: String,
    pub sequence_policy: SequencePolicy,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
            sequence_policy: SequencePolicy::Guarded,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub backend: BackendSettings,
    pub session: SessionSettings,
    /// Initial ConfigModel, percentage units.
    pub defaults: ConfigModel,
    pub overlay: OverlayOptions,
}

impl Settings {
    /// `<config_dir>/macdscope/settings.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("macdscope").join("settings.toml"))
    }

    /// Parse and validate TOML text. No environment override.
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.defaults.validate()?;
        Ok(settings)
    }

    /// Load from `path`; missing file means defaults. Applies the environment override.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let mut settings = match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text, path)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no settings at {}, using defaults", path.display());
                Settings::default()
            }
            Err(source) => {
                return Err(SettingsError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        settings.apply_env_override(std::env::var(BACKEND_URL_ENV).ok());
        Ok(settings)
    }

    /// Load from `path` if given, else from [`Settings::default_path`], else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(p) => Self::load(&p),
            None => {
                let mut settings = Settings::default();
                settings.apply_env_override(std::env::var(BACKEND_URL_ENV).ok());
                Ok(settings)
            }
        }
    }

    pub fn apply_env_override(&mut self, backend_url: Option<String>) {
        if let Some(url) = backend_url.filter(|u| !u.trim().is_empty()) {
            debug!("backend URL overridden by {BACKEND_URL_ENV}");
            self.backend.base_url = url.trim().to_string();
        }
    }

    /// Write as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let io_err = |source: std::io::Error| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let text = toml::to_string_pretty(self)?;
        std::fs::write(path, text).map_err(io_err)
    }

    /// A fresh store seeded with `[defaults]` and the session's sequence policy.
    pub fn store(&self) -> ResultStore {
        ResultStore::new(self.defaults.clone(), self.session.sequence_policy)
    }
}
