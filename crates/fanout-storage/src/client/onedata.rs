//! Onedata backend speaking the Oneprovider CDMI interface

use async_trait::async_trait;
use fanout_core::utils::split_storage_path;
use fanout_core::{Error, Result, StorageProvider};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use url::Url;

use super::{local_path, StorageClient};

const AUTH_HEADER: &str = "X-Auth-Token";
const CDMI_ROOT: &str = "cdmi";

/// Client for a Oneprovider. Containers are Onedata spaces.
///
/// With `auth.space` set, paths that do not start with that space are keys
/// inside it.
pub struct OnedataClient {
    http: Client,
    base_url: Url,
    token: String,
    space: Option<String>,
}

impl OnedataClient {
    pub fn new(provider: &StorageProvider) -> Result<Self> {
        let endpoint = provider
            .auth
            .endpoint
            .as_deref()
            .filter(|e| !e.is_empty())
            .ok_or_else(|| {
                Error::invalid_config(format!(
                    "Onedata provider '{}' has no endpoint",
                    provider.name
                ))
            })?;
        let token = provider
            .auth
            .token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                Error::invalid_config(format!("Onedata provider '{}' has no token", provider.name))
            })?;

        let space = provider.auth.space.clone().filter(|s| !s.is_empty());
        let base_url = parse_endpoint(endpoint)?;
        let http = Client::builder()
            .build()
            .map_err(|e| Error::invalid_config(format!("Failed to create HTTP client: {}", e)))?;

        debug!(
            "Created Onedata client for storage provider '{}' at {}",
            provider.name, base_url
        );

        Ok(Self {
            http,
            base_url,
            token,
            space,
        })
    }

    /// Split a storage path into (space, key)
    fn resolve<'a>(&'a self, path: &'a str) -> Option<(&'a str, &'a str)> {
        let Some(space) = self.space.as_deref() else {
            return split_storage_path(path);
        };

        let trimmed = path.trim_matches('/');
        match split_storage_path(trimmed) {
            Some((first, key)) if first == space => Some((space, key)),
            _ if !trimmed.is_empty() && trimmed != space => Some((space, trimmed)),
            _ => None,
        }
    }

    /// CDMI URL of `key` inside the `space` container
    fn object_url(&self, space: &str, key: &str) -> Option<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .push(CDMI_ROOT)
            .push(space)
            .extend(key.split('/'));
        Some(url)
    }
}

#[async_trait]
impl StorageClient for OnedataClient {
    async fn download(&self, work_dir: &Path, source_path: &str) -> Result<PathBuf> {
        let (space, key) = self.resolve(source_path).ok_or_else(|| {
            Error::Download(format!(
                "path '{}' does not name an object inside a space",
                source_path
            ))
        })?;
        let url = self
            .object_url(space, key)
            .ok_or_else(|| Error::Download(format!("Cannot build URL for '{}'", source_path)))?;
        let final_path = local_path(work_dir, key);

        let mut response = self
            .http
            .get(url.clone())
            .header(AUTH_HEADER, &self.token)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::Download(format!("{}: {}", url, e)))?;

        let mut file = fs::File::create(&final_path)
            .await
            .map_err(|e| Error::Download(format!("Error creating file {:?}: {}", final_path, e)))?;

        let mut written: u64 = 0;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| Error::Download(format!("{}: {}", url, e)))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| Error::Download(format!("Error saving new file: {}", e)))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| Error::Download(format!("Error saving new file: {}", e)))?;

        debug!("Downloaded {} ({} bytes)", url, written);
        Ok(final_path)
    }

    async fn upload(&self, local_file: &Path, destination_path: &str) -> Result<()> {
        let (space, key) = self.resolve(destination_path).ok_or_else(|| {
            Error::Upload(format!(
                "path '{}' does not name an object inside a space",
                destination_path
            ))
        })?;
        let url = self.object_url(space, key).ok_or_else(|| {
            Error::Upload(format!("Cannot build URL for '{}'", destination_path))
        })?;

        let data = fs::read(local_file)
            .await
            .map_err(|e| Error::Upload(format!("Error opening file {:?}: {}", local_file, e)))?;

        self.http
            .put(url.clone())
            .header(AUTH_HEADER, &self.token)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(data)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::Upload(format!("{}: {}", url, e)))?;

        debug!("Uploaded {:?} to {}", local_file, url);
        Ok(())
    }
}

/// Oneproviders are served over HTTPS; a bare host name gets the scheme added
fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let with_scheme = if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("https://{}", endpoint)
    };
    Url::parse(&with_scheme)
        .map_err(|e| Error::invalid_config(format!("Invalid Onedata endpoint '{}': {}", endpoint, e)))
}
