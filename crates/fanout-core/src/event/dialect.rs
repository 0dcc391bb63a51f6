//! Provider notification dialects
//!
//! Each dialect is a strictly typed view over the first record of a
//! notification. Unknown fields are ignored; missing or mistyped required
//! fields fail the parse.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::ProviderKind;

/// `eventSource` value sent by Onedata's OneTrigger
pub const ONE_TRIGGER_SOURCE: &str = "OneTrigger";
/// `eventSource` value sent by Amazon S3
pub const AWS_S3_SOURCE: &str = "aws:s3";
/// `eventSource` value sent by MinIO
pub const MINIO_S3_SOURCE: &str = "minio:s3";

/// Record shape emitted by OneTrigger
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneTriggerRecord {
    pub object_key: String,
    pub event_time: String,
}

/// Record shape shared by S3 and MinIO
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3StyleRecord {
    pub event_time: String,
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Object {
    /// URL-encoded object key
    pub key: String,
}

/// First notification record, classified by its `eventSource`
#[derive(Debug, Clone)]
pub enum RawDialect {
    OneTrigger(OneTriggerRecord),
    S3Style {
        source: ProviderKind,
        record: S3StyleRecord,
    },
    Unrecognized(String),
}

impl RawDialect {
    /// Classify a record and parse it against the matching schema
    pub fn parse(record: &Value) -> Result<Self> {
        let fields = record
            .as_object()
            .ok_or_else(|| Error::invalid_event("first record is not an object"))?;

        let source = match fields.get("eventSource") {
            Some(Value::String(s)) => s.as_str(),
            Some(other) => return Ok(Self::Unrecognized(other.to_string())),
            None => return Ok(Self::Unrecognized(String::new())),
        };

        match source {
            ONE_TRIGGER_SOURCE => Ok(Self::OneTrigger(typed(record, source)?)),
            AWS_S3_SOURCE => Ok(Self::S3Style {
                source: ProviderKind::S3,
                record: typed(record, source)?,
            }),
            MINIO_S3_SOURCE => Ok(Self::S3Style {
                source: ProviderKind::Minio,
                record: typed(record, source)?,
            }),
            other => Ok(Self::Unrecognized(other.to_string())),
        }
    }
}

fn typed<T: DeserializeOwned>(record: &Value, source: &str) -> Result<T> {
    T::deserialize(record)
        .map_err(|e| Error::invalid_event(format!("malformed {} record: {}", source, e)))
}
