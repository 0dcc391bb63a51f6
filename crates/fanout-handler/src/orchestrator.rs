//! Transfer orchestrator
//!
//! Downloads the object an event refers to once, then uploads it to every
//! routed destination. A failed upload is recorded and the remaining
//! destinations are still attempted; a failed download ends the transfer
//! before any upload.

use fanout_core::utils::base_name;
use fanout_core::{Error, Event, FanoutConfig, Result, RoutingDecision};
use fanout_storage::{ClientFactory, StorageClient};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Result of one destination's upload attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    /// Destination provider name
    pub provider: String,
    /// Full destination path of the uploaded object
    pub destination: String,
    /// `Err` carries the failure description
    pub result: std::result::Result<(), String>,
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// What happened to one event's object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReport {
    /// Provider the object was downloaded from
    pub source_provider: String,
    /// Base name of the downloaded file
    pub file_name: String,
    /// One entry per routed destination
    pub uploads: Vec<UploadOutcome>,
}

impl TransferReport {
    pub fn succeeded(&self) -> usize {
        self.uploads.iter().filter(|u| u.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.uploads.len() - self.succeeded()
    }
}

/// Copy the event's object to every destination of `destinations`.
///
/// The source is the first configured provider whose type matches the
/// event source. The scratch directory holding the download is removed once
/// every upload has been attempted, whatever their outcome.
pub async fn process(
    event: &Event,
    config: &FanoutConfig,
    destinations: &RoutingDecision,
    factory: &dyn ClientFactory,
) -> Result<TransferReport> {
    let work_dir = tempfile::Builder::new().prefix("fanout-").tempdir()?;

    let source = config
        .providers_of_kind(event.event_source)
        .next()
        .ok_or_else(|| Error::NoSourceProvider(event.event_source.to_string()))?;

    let source_client = factory.get_client(source).await.ok_or_else(|| {
        Error::NoSourceProvider(format!(
            "{} (storage provider '{}' has no usable client)",
            event.event_source, source.name
        ))
    })?;

    let local_file = source_client.download(work_dir.path(), &event.path).await?;
    info!(
        "File '{}' successfully downloaded from storage provider '{}'",
        event.object_key, source.name
    );

    let file_name = local_file
        .to_str()
        .map(base_name)
        .unwrap_or(event.file_name())
        .to_string();

    let mut clients: HashMap<String, Arc<dyn StorageClient>> = HashMap::new();
    clients.insert(source.name.clone(), source_client);

    let mut uploads = Vec::with_capacity(destinations.len());
    for (provider_name, provider_path) in destinations.iter() {
        let destination = destination_path(provider_path, &file_name);
        let result = upload_to(
            config,
            factory,
            &mut clients,
            provider_name,
            &local_file,
            &destination,
        )
        .await;

        match &result {
            Ok(()) => info!(
                "File '{}' successfully uploaded to storage provider '{}'",
                file_name, provider_name
            ),
            Err(e) => warn!(
                code = e.code(),
                "Error uploading file '{}' to storage provider '{}': {}", file_name, provider_name, e
            ),
        }

        uploads.push(UploadOutcome {
            provider: provider_name.to_string(),
            destination,
            result: result.map_err(|e| e.to_string()),
        });
    }

    let work_path = work_dir.path().to_path_buf();
    if let Err(e) = work_dir.close() {
        error!("Failed to remove working directory {:?}: {}", work_path, e);
    }

    Ok(TransferReport {
        source_provider: source.name.clone(),
        file_name,
        uploads,
    })
}

/// Object path for `file_name` inside the destination directory
fn destination_path(dir: &str, file_name: &str) -> String {
    format!("{}/{}", dir.trim_end_matches('/'), file_name)
}

/// Upload to one destination, resolving (and caching) its client first
async fn upload_to(
    config: &FanoutConfig,
    factory: &dyn ClientFactory,
    clients: &mut HashMap<String, Arc<dyn StorageClient>>,
    provider_name: &str,
    local_file: &Path,
    destination: &str,
) -> Result<()> {
    let client = match clients.get(provider_name) {
        Some(client) => Arc::clone(client),
        None => {
            let provider = config.provider(provider_name).ok_or_else(|| {
                Error::Upload(format!("storage provider '{}' is not declared", provider_name))
            })?;
            let client = factory.get_client(provider).await.ok_or_else(|| {
                Error::Upload(format!(
                    "no client available for storage provider '{}'",
                    provider_name
                ))
            })?;
            debug!("Created client for storage provider '{}'", provider_name);
            clients.insert(provider_name.to_string(), Arc::clone(&client));
            client
        }
    };

    client.upload(local_file, destination).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use fanout_core::{ProviderKind, StorageProvider};
    use std::collections::HashSet;
    use std::path::PathBuf;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        created: Mutex<Vec<String>>,
        downloads: Mutex<Vec<(String, String)>>,
        uploads: Mutex<Vec<(String, String)>>,
        work_dirs: Mutex<Vec<PathBuf>>,
    }

    struct FakeClient {
        name: String,
        recorder: Arc<Recorder>,
        fail_download: bool,
        fail_upload: bool,
    }

    #[async_trait]
    impl StorageClient for FakeClient {
        async fn download(&self, work_dir: &Path, source_path: &str) -> Result<PathBuf> {
            self.recorder
                .downloads
                .lock()
                .unwrap()
                .push((self.name.clone(), source_path.to_string()));
            self.recorder
                .work_dirs
                .lock()
                .unwrap()
                .push(work_dir.to_path_buf());
            if self.fail_download {
                return Err(Error::Download("object not found".to_string()));
            }
            let path = work_dir.join(base_name(source_path));
            tokio::fs::write(&path, b"payload").await?;
            Ok(path)
        }

        async fn upload(&self, local_file: &Path, destination_path: &str) -> Result<()> {
            assert!(local_file.exists(), "upload attempted after cleanup");
            self.recorder
                .uploads
                .lock()
                .unwrap()
                .push((self.name.clone(), destination_path.to_string()));
            if self.fail_upload {
                return Err(Error::Upload("access denied".to_string()));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeFactory {
        recorder: Arc<Recorder>,
        failing_downloads: HashSet<String>,
        failing_uploads: HashSet<String>,
        unavailable: HashSet<String>,
    }

    #[async_trait]
    impl ClientFactory for FakeFactory {
        async fn get_client(&self, provider: &StorageProvider) -> Option<Arc<dyn StorageClient>> {
            self.recorder
                .created
                .lock()
                .unwrap()
                .push(provider.name.clone());
            if self.unavailable.contains(&provider.name) {
                return None;
            }
            Some(Arc::new(FakeClient {
                name: provider.name.clone(),
                recorder: Arc::clone(&self.recorder),
                fail_download: self.failing_downloads.contains(&provider.name),
                fail_upload: self.failing_uploads.contains(&provider.name),
            }))
        }
    }

    fn minio_event() -> Event {
        Event {
            path: "images/nature-wallpaper-229.jpg".to_string(),
            object_key: "nature-wallpaper-229.jpg".to_string(),
            event_time: "2018-06-29T10:23:44Z".to_string(),
            event_source: ProviderKind::Minio,
        }
    }

    fn config(providers: &[(&str, ProviderKind)]) -> FanoutConfig {
        let mut config = FanoutConfig::default();
        for (name, kind) in providers {
            config
                .storage_providers
                .insert(name.to_string(), StorageProvider::new(*name, *kind));
        }
        config
    }

    fn decision(entries: &[(&str, &str)]) -> RoutingDecision {
        let mut decision = RoutingDecision::new();
        for (name, path) in entries {
            decision.insert(*name, *path);
        }
        decision
    }

    #[test]
    fn test_destination_path() {
        assert_eq!(destination_path("out", "dog.jpg"), "out/dog.jpg");
        assert_eq!(destination_path("out/", "dog.jpg"), "out/dog.jpg");
        assert_eq!(destination_path("out/images//", "dog.jpg"), "out/images/dog.jpg");
    }

    #[tokio::test]
    async fn test_failed_upload_does_not_stop_others() {
        let config = config(&[
            ("a-minio", ProviderKind::Minio),
            ("b-s3", ProviderKind::S3),
            ("c-s3", ProviderKind::S3),
        ]);
        let destinations = decision(&[("a-minio", "first"), ("b-s3", "second"), ("c-s3", "third")]);
        let factory = FakeFactory {
            failing_uploads: HashSet::from(["b-s3".to_string()]),
            ..Default::default()
        };

        let report = process(&minio_event(), &config, &destinations, &factory)
            .await
            .unwrap();

        assert_eq!(report.source_provider, "a-minio");
        assert_eq!(report.file_name, "nature-wallpaper-229.jpg");
        assert_eq!(report.uploads.len(), 3);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert!(report.uploads[0].is_success());
        assert!(!report.uploads[1].is_success());
        assert!(report.uploads[2].is_success());

        let uploads = factory.recorder.uploads.lock().unwrap().clone();
        assert_eq!(
            uploads,
            vec![
                ("a-minio".to_string(), "first/nature-wallpaper-229.jpg".to_string()),
                ("b-s3".to_string(), "second/nature-wallpaper-229.jpg".to_string()),
                ("c-s3".to_string(), "third/nature-wallpaper-229.jpg".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_source_client_is_reused() {
        let config = config(&[("minio", ProviderKind::Minio), ("s3", ProviderKind::S3)]);
        let destinations = decision(&[("minio", "copies"), ("s3", "out/")]);
        let factory = FakeFactory::default();

        let report = process(&minio_event(), &config, &destinations, &factory)
            .await
            .unwrap();

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.uploads[1].destination, "out/nature-wallpaper-229.jpg");
        let created = factory.recorder.created.lock().unwrap().clone();
        assert_eq!(created, vec!["minio".to_string(), "s3".to_string()]);
        let downloads = factory.recorder.downloads.lock().unwrap().clone();
        assert_eq!(
            downloads,
            vec![("minio".to_string(), "images/nature-wallpaper-229.jpg".to_string())]
        );
    }

    #[tokio::test]
    async fn test_no_source_provider() {
        let event = Event {
            path: "/my-onedata-space/files/file.txt".to_string(),
            object_key: "file.txt".to_string(),
            event_time: "2019-02-07T09:51:04.347823".to_string(),
            event_source: ProviderKind::Onedata,
        };
        let config = config(&[("minio", ProviderKind::Minio)]);
        let destinations = decision(&[("minio", "out")]);
        let factory = FakeFactory::default();

        let err = process(&event, &config, &destinations, &factory)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NoSourceProvider(_)));
        assert!(factory.recorder.uploads.lock().unwrap().is_empty());
        assert!(factory.recorder.downloads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_source_without_client_aborts() {
        let config = config(&[("minio", ProviderKind::Minio), ("s3", ProviderKind::S3)]);
        let destinations = decision(&[("s3", "out")]);
        let factory = FakeFactory {
            unavailable: HashSet::from(["minio".to_string()]),
            ..Default::default()
        };

        let err = process(&minio_event(), &config, &destinations, &factory)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NoSourceProvider(_)));
        assert!(factory.recorder.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_download_failure_aborts() {
        let config = config(&[("minio", ProviderKind::Minio), ("s3", ProviderKind::S3)]);
        let destinations = decision(&[("s3", "out")]);
        let factory = FakeFactory {
            failing_downloads: HashSet::from(["minio".to_string()]),
            ..Default::default()
        };

        let err = process(&minio_event(), &config, &destinations, &factory)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Download(_)));
        assert!(factory.recorder.uploads.lock().unwrap().is_empty());
        let work_dirs = factory.recorder.work_dirs.lock().unwrap().clone();
        assert_eq!(work_dirs.len(), 1);
        assert!(!work_dirs[0].exists());
    }

    #[tokio::test]
    async fn test_undeclared_destination_is_a_failed_upload() {
        let config = config(&[("minio", ProviderKind::Minio), ("s3", ProviderKind::S3)]);
        let destinations = decision(&[("ghost", "nowhere"), ("s3", "out")]);
        let factory = FakeFactory::default();

        let report = process(&minio_event(), &config, &destinations, &factory)
            .await
            .unwrap();

        assert_eq!(report.uploads.len(), 2);
        assert_eq!(report.uploads[0].provider, "ghost");
        assert!(report.uploads[0]
            .result
            .as_ref()
            .unwrap_err()
            .contains("not declared"));
        assert!(report.uploads[1].is_success());
    }

    #[tokio::test]
    async fn test_destination_without_client_is_a_failed_upload() {
        let config = config(&[("minio", ProviderKind::Minio), ("s3", ProviderKind::S3)]);
        let destinations = decision(&[("s3", "out")]);
        let factory = FakeFactory {
            unavailable: HashSet::from(["s3".to_string()]),
            ..Default::default()
        };

        let report = process(&minio_event(), &config, &destinations, &factory)
            .await
            .unwrap();

        assert_eq!(report.failed(), 1);
        assert!(factory.recorder.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_work_dir_removed_after_uploads() {
        let config = config(&[("minio", ProviderKind::Minio)]);
        let destinations = decision(&[("minio", "copies")]);
        let factory = FakeFactory::default();

        process(&minio_event(), &config, &destinations, &factory)
            .await
            .unwrap();

        let work_dirs = factory.recorder.work_dirs.lock().unwrap().clone();
        assert_eq!(work_dirs.len(), 1);
        assert!(!work_dirs[0].exists());
    }
}
