//! Event normalization
//!
//! Turns a raw storage notification into the canonical [`Event`]. Supported
//! dialects:
//! - OneTrigger (Onedata)
//! - Amazon S3 (`aws:s3`)
//! - MinIO (`minio:s3`)
//!
//! Only the first entry of `Records` is looked at; any further records of a
//! batch are ignored.

mod dialect;

pub use dialect::{
    OneTriggerRecord, RawDialect, S3StyleRecord, AWS_S3_SOURCE, MINIO_S3_SOURCE,
    ONE_TRIGGER_SOURCE,
};

use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::{Event, ProviderKind};
use crate::utils::query_unescape;

/// Parse a raw notification payload into a canonical event
pub fn normalize(raw: &[u8]) -> Result<Event> {
    let document: Value = serde_json::from_slice(raw)
        .map_err(|e| Error::invalid_event(format!("payload is not valid JSON: {}", e)))?;

    let records = document
        .get("Records")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::invalid_event("missing Records list"))?;

    let first = records
        .first()
        .ok_or_else(|| Error::invalid_event("Records list is empty"))?;

    let dialect = RawDialect::parse(first)?;
    into_event(dialect, &document)
}

/// Map a classified record to the canonical event
fn into_event(dialect: RawDialect, document: &Value) -> Result<Event> {
    match dialect {
        RawDialect::OneTrigger(record) => {
            let path = document
                .get("Key")
                .and_then(Value::as_str)
                .ok_or_else(|| Error::invalid_event("OneTrigger event without a Key"))?;

            Ok(Event {
                path: path.to_string(),
                object_key: record.object_key,
                event_time: record.event_time,
                event_source: ProviderKind::Onedata,
            })
        }
        RawDialect::S3Style { source, record } => {
            let key = query_unescape(&record.s3.object.key).map_err(Error::InvalidEvent)?;

            Ok(Event {
                path: format!("{}/{}", record.s3.bucket.name, key),
                object_key: key,
                event_time: record.event_time,
                event_source: source,
            })
        }
        RawDialect::Unrecognized(source) => Err(Error::invalid_event(format!(
            "unsupported event source {:?}",
            source
        ))),
    }
}
