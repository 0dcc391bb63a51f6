//! Storage provider types

use serde::{Deserialize, Serialize};

/// Storage backend families Fanout can read from and write to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProviderKind {
    S3,
    Minio,
    Onedata,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S3 => "s3",
            Self::Minio => "minio",
            Self::Onedata => "onedata",
        }
    }

    /// Case-insensitive lookup, `None` for unknown families
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "s3" => Some(Self::S3),
            "minio" => Some(Self::Minio),
            "onedata" => Some(Self::Onedata),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Credentials and location of a storage provider.
///
/// Every field is optional; which ones matter depends on the provider type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageAuth {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// A named storage provider declared in the configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageProvider {
    /// Unique name, referenced by output rules
    pub name: String,
    /// Provider type as declared; see [`StorageProvider::kind`]
    #[serde(rename = "type")]
    pub provider_type: String,
    #[serde(default)]
    pub auth: StorageAuth,
}

impl StorageProvider {
    pub fn new(name: impl Into<String>, kind: ProviderKind) -> Self {
        Self {
            name: name.into(),
            provider_type: kind.as_str().to_string(),
            auth: StorageAuth::default(),
        }
    }

    pub fn with_auth(mut self, auth: StorageAuth) -> Self {
        self.auth = auth;
        self
    }

    /// Resolved provider family, `None` when the type is not supported
    pub fn kind(&self) -> Option<ProviderKind> {
        ProviderKind::parse(&self.provider_type)
    }
}
