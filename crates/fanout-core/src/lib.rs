//! Fanout Core Library
//!
//! Canonical event model, configuration and routing for the Fanout file router.

pub mod config;
pub mod error;
pub mod event;
pub mod routing;
pub mod types;
pub mod utils;

pub use config::FanoutConfig;
pub use error::{Error, Result};
pub use event::normalize;
pub use routing::{compute_destinations, RoutingDecision};
pub use types::{Event, OutputRule, ProviderKind, StorageAuth, StorageProvider};

/// Fanout version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default S3 region
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default directory holding function secrets
pub const DEFAULT_SECRETS_DIR: &str = "/var/openfaas/secrets";

/// Default config file name inside the secrets directory
pub const DEFAULT_CONFIG_FILE: &str = "config";
