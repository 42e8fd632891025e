use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::container::ContainerRef;

/// One structured log line, in the flat document shape written to the backend.
///
/// Created once per non-empty decoded line, never mutated, consumed exactly
/// once by the sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Processing time of the line, not the runtime's own per-line timestamp.
    #[serde(rename = "@timestamp")]
    pub timestamp: String,
    pub message: String,
    pub container_id: String,
    pub container_name: String,
    pub node: String,
}

impl LogRecord {
    /// Stamps `message` with the current UTC time and the identity of the
    /// worker that decoded it.
    pub fn now(message: String, container: &ContainerRef, node: &str) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            message,
            container_id: container.id.to_string(),
            container_name: container.name.clone(),
            node: node.to_owned(),
        }
    }
}
