//! Configuration for Fanout
//!
//! Example config (JSON):
//! ```json
//! {
//!   "storages": {
//!     "s3": [{"name": "s3-bucket"}],
//!     "minio": [{
//!       "name": "minio-bucket",
//!       "auth": {"access_key": "muser", "secret_key": "mpass", "endpoint": "http://myminio.example"}
//!     }]
//!   },
//!   "output": [
//!     {"storage_name": "s3-bucket", "path": "ffmpeg/video-output", "suffix": ["avi", "txt"]},
//!     {"storage_name": "minio-bucket", "path": "ffmpeg/audio", "suffix": ["wav"]}
//!   ]
//! }
//! ```
//!
//! The same document may be written in TOML when the file name ends with
//! `.toml`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{Error, Result};
use crate::types::{OutputRule, ProviderKind, StorageAuth, StorageProvider};

/// Loaded configuration of one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FanoutConfig {
    /// Providers keyed by their unique name
    pub storage_providers: BTreeMap<String, StorageProvider>,
    /// Output rules in declared order
    pub outputs: Vec<OutputRule>,
}

/// A provider entry as written inside a type group
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProviderEntry {
    name: String,
    #[serde(default)]
    auth: StorageAuth,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Storages {
    #[serde(default)]
    s3: Vec<ProviderEntry>,
    #[serde(default)]
    minio: Vec<ProviderEntry>,
    #[serde(default)]
    onedata: Vec<ProviderEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawConfig {
    #[serde(default)]
    storages: Storages,
    #[serde(default, rename = "output")]
    outputs: Vec<OutputRule>,
}

impl From<RawConfig> for FanoutConfig {
    fn from(raw: RawConfig) -> Self {
        let groups = [
            (ProviderKind::S3, raw.storages.s3),
            (ProviderKind::Minio, raw.storages.minio),
            (ProviderKind::Onedata, raw.storages.onedata),
        ];

        let mut storage_providers = BTreeMap::new();
        for (kind, entries) in groups {
            for entry in entries {
                let provider = StorageProvider::new(entry.name, kind).with_auth(entry.auth);
                storage_providers.insert(provider.name.clone(), provider);
            }
        }

        Self {
            storage_providers,
            outputs: raw.outputs,
        }
    }
}

impl FanoutConfig {
    /// Parse a JSON document
    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(content)
            .map_err(|e| Error::invalid_config(format!("Invalid config format: {}", e)))?;
        Ok(raw.into())
    }

    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::invalid_config(format!("Invalid config format: {}", e)))?;
        Ok(raw.into())
    }

    /// Read a JSON document from any reader
    pub fn from_reader(mut reader: impl Read) -> Result<Self> {
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .map_err(|e| Error::invalid_config(format!("Error loading config file: {}", e)))?;
        Self::from_json_str(&content)
    }

    /// Load a config file, picking the format from its extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::invalid_config(format!("Error opening config file {:?}: {}", path, e))
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            _ => Self::from_json_str(&content),
        }
    }

    /// Resolve the config file location from the environment.
    ///
    /// `CONFIG_FILE` names the file (default `config`) inside the secrets
    /// directory, which `FANOUT_SECRETS_DIR` overrides.
    pub fn locate() -> PathBuf {
        let dir = std::env::var("FANOUT_SECRETS_DIR")
            .unwrap_or_else(|_| crate::DEFAULT_SECRETS_DIR.to_string());
        let file = std::env::var("CONFIG_FILE")
            .unwrap_or_else(|_| crate::DEFAULT_CONFIG_FILE.to_string());
        PathBuf::from(dir).join(file)
    }

    /// Look up a provider by name
    pub fn provider(&self, name: &str) -> Option<&StorageProvider> {
        self.storage_providers.get(name)
    }

    /// Providers of one family, in iteration order
    pub fn providers_of_kind(&self, kind: ProviderKind) -> impl Iterator<Item = &StorageProvider> {
        self.storage_providers
            .values()
            .filter(move |p| p.kind() == Some(kind))
    }

    /// Report output rules that can never be delivered.
    ///
    /// Unknown destinations are not rejected: they surface as a failed
    /// upload for that destination alone.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for output in &self.outputs {
            if self.provider(&output.storage_name).is_none() {
                problems.push(format!(
                    "output rule targets undeclared storage provider '{}'",
                    output.storage_name
                ));
            }
            if output.path.trim_matches('/').is_empty() {
                problems.push(format!(
                    "output rule for '{}' has an empty path",
                    output.storage_name
                ));
            }
        }
        for problem in &problems {
            warn!("{}", problem);
        }
        problems
    }
}

/// Logging settings for the `fanout` binary
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}
