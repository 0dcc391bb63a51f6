//! Canonical event types

use super::ProviderKind;

/// Provider-agnostic storage event.
///
/// Built by [`crate::event::normalize`] from any supported notification
/// dialect. For S3-style events `path` is `<bucket>/<object_key>`; OneTrigger
/// events carry their `Key` unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Full location of the object, `<container>/<key>`
    pub path: String,
    /// Key of the object without its container
    pub object_key: String,
    /// Timestamp as reported by the origin, never reparsed
    pub event_time: String,
    /// Canonical origin of the event
    pub event_source: ProviderKind,
}

impl Event {
    /// Base name of the object key (the part after the last `/`)
    pub fn file_name(&self) -> &str {
        self.object_key
            .rsplit('/')
            .next()
            .unwrap_or(&self.object_key)
    }
}
