//! Storage client factory

use async_trait::async_trait;
use fanout_core::{ProviderKind, StorageProvider};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::client::{OnedataClient, S3Client, StorageClient};

/// Turns provider declarations into clients.
///
/// `None` means no client can be built for the provider; callers decide
/// what that means for them.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn get_client(&self, provider: &StorageProvider) -> Option<Arc<dyn StorageClient>>;
}

/// Factory backed by the real storage backends
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultClientFactory;

#[async_trait]
impl ClientFactory for DefaultClientFactory {
    async fn get_client(&self, provider: &StorageProvider) -> Option<Arc<dyn StorageClient>> {
        get_client(provider).await
    }
}

/// Build the client matching a provider's type (case-insensitive).
///
/// Unsupported types and incomplete declarations yield `None`.
pub async fn get_client(provider: &StorageProvider) -> Option<Arc<dyn StorageClient>> {
    let Some(kind) = provider.kind() else {
        debug!(
            "No client for storage provider '{}' of type '{}'",
            provider.name, provider.provider_type
        );
        return None;
    };

    let client: fanout_core::Result<Arc<dyn StorageClient>> = match kind {
        ProviderKind::S3 | ProviderKind::Minio => S3Client::connect(provider)
            .await
            .map(|c| Arc::new(c) as Arc<dyn StorageClient>),
        ProviderKind::Onedata => {
            OnedataClient::new(provider).map(|c| Arc::new(c) as Arc<dyn StorageClient>)
        }
    };

    match client {
        Ok(client) => Some(client),
        Err(e) => {
            warn!(
                "Cannot create client for storage provider '{}': {}",
                provider.name, e
            );
            None
        }
    }
}
