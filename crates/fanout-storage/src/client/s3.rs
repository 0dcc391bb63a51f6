//! S3 and MinIO backend built on the AWS SDK

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use fanout_core::{Error, ProviderKind, Result, StorageProvider, DEFAULT_REGION};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::{download_target, local_path, upload_target, StorageClient};

/// Client for Amazon S3 and S3-compatible stores such as MinIO
pub struct S3Client {
    client: Client,
}

impl S3Client {
    /// Build a client from a provider declaration.
    ///
    /// Static keys are used when both are configured, the default AWS
    /// credential chain otherwise. MinIO providers need an endpoint and are
    /// addressed path-style.
    pub async fn connect(provider: &StorageProvider) -> Result<Self> {
        let kind = provider.kind();
        let auth = &provider.auth;
        let region = auth
            .region
            .clone()
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let endpoint = match (kind, auth.endpoint.as_deref()) {
            (_, Some(endpoint)) if !endpoint.is_empty() => Some(normalize_endpoint(endpoint)),
            (Some(ProviderKind::Minio), _) => {
                return Err(Error::invalid_config(format!(
                    "MinIO provider '{}' has no endpoint",
                    provider.name
                )));
            }
            _ => None,
        };

        let builder = match (&auth.access_key, &auth.secret_key) {
            (Some(access_key), Some(secret_key)) => {
                let credentials =
                    Credentials::new(access_key, secret_key, auth.token.clone(), None, "fanout");
                S3ConfigBuilder::new()
                    .behavior_version(BehaviorVersion::latest())
                    .credentials_provider(credentials)
            }
            _ => {
                let shared = aws_config::defaults(BehaviorVersion::latest()).load().await;
                S3ConfigBuilder::from(&shared)
            }
        };

        let path_style = kind == Some(ProviderKind::Minio) || endpoint.is_some();
        let mut builder = builder
            .region(Region::new(region))
            .force_path_style(path_style);
        if let Some(endpoint) = endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        debug!(
            "Created S3 client for storage provider '{}' (path style: {})",
            provider.name, path_style
        );

        Ok(Self {
            client: Client::from_conf(builder.build()),
        })
    }
}

#[async_trait]
impl StorageClient for S3Client {
    async fn download(&self, work_dir: &Path, source_path: &str) -> Result<PathBuf> {
        let (bucket, key) = download_target(source_path)?;
        let final_path = local_path(work_dir, key);

        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                Error::Download(format!("s3://{}/{}: {}", bucket, key, DisplayErrorContext(e)))
            })?;

        let mut file = fs::File::create(&final_path)
            .await
            .map_err(|e| Error::Download(format!("Error creating file {:?}: {}", final_path, e)))?;

        let mut stream = resp.body.into_async_read();
        let written = tokio::io::copy(&mut stream, &mut file)
            .await
            .map_err(|e| Error::Download(format!("Error saving new file: {}", e)))?;
        file.flush()
            .await
            .map_err(|e| Error::Download(format!("Error saving new file: {}", e)))?;

        debug!("Downloaded s3://{}/{} ({} bytes)", bucket, key, written);
        Ok(final_path)
    }

    async fn upload(&self, local_file: &Path, destination_path: &str) -> Result<()> {
        let (bucket, key) = upload_target(destination_path)?;

        let body = ByteStream::from_path(local_file)
            .await
            .map_err(|e| Error::Upload(format!("Error opening file {:?}: {}", local_file, e)))?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                Error::Upload(format!("s3://{}/{}: {}", bucket, key, DisplayErrorContext(e)))
            })?;

        debug!("Uploaded {:?} to s3://{}/{}", local_file, bucket, key);
        Ok(())
    }
}

/// Endpoints without a scheme are plain HTTP, as MinIO deployments usually are
fn normalize_endpoint(endpoint: &str) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.trim_end_matches('/').to_string()
    } else {
        format!("http://{}", endpoint.trim_end_matches('/'))
    }
}
