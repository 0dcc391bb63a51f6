//! Storage client contract
//!
//! A storage path is `<container>/<key>`: the container is a bucket or a
//! Onedata space, the key a slash-separated object name.

mod onedata;
mod s3;

pub use onedata::OnedataClient;
pub use s3::S3Client;

use async_trait::async_trait;
use fanout_core::utils::{base_name, split_storage_path};
use fanout_core::{Error, Result};
use std::path::{Path, PathBuf};

/// Storage client trait
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Fetch `source_path` into `work_dir`, named after the key's base name.
    /// Returns the path of the local file.
    async fn download(&self, work_dir: &Path, source_path: &str) -> Result<PathBuf>;

    /// Store the contents of `local_file` at `destination_path`
    async fn upload(&self, local_file: &Path, destination_path: &str) -> Result<()>;
}

/// Split a download source into (container, key)
pub(crate) fn download_target(source_path: &str) -> Result<(&str, &str)> {
    split_storage_path(source_path).ok_or_else(|| {
        Error::Download(format!(
            "path '{}' does not name an object inside a container",
            source_path
        ))
    })
}

/// Split an upload destination into (container, key)
pub(crate) fn upload_target(destination_path: &str) -> Result<(&str, &str)> {
    split_storage_path(destination_path).ok_or_else(|| {
        Error::Upload(format!(
            "path '{}' does not name an object inside a container",
            destination_path
        ))
    })
}

/// Local file a download of `key` lands in
pub(crate) fn local_path(work_dir: &Path, key: &str) -> PathBuf {
    work_dir.join(base_name(key))
}
