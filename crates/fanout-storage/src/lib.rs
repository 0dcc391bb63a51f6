//! Fanout Storage
//!
//! The download/upload contract the router relies on, the factory turning a
//! provider declaration into a client, and the concrete backends.

pub mod client;
pub mod factory;

pub use client::{OnedataClient, S3Client, StorageClient};
pub use factory::{get_client, ClientFactory, DefaultClientFactory};
