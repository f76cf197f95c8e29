use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Predicate over the raw argument sequence of a channel call. When a
/// collector carries a filter, it is the sole gate for recording.
pub type LogFilter = Arc<dyn Fn(&[Value]) -> bool + Send + Sync>;

/// Timestamp representation, chosen once per collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampFormat {
    /// RFC 3339 / ISO 8601 string.
    Iso,
    /// Milliseconds since the Unix epoch, as a decimal string.
    Epoch,
}

impl TimestampFormat {
    pub fn render_now(&self) -> String {
        match self {
            TimestampFormat::Iso => Utc::now().to_rfc3339(),
            TimestampFormat::Epoch => Utc::now().timestamp_millis().to_string(),
        }
    }
}

/// Construction-time policy for a collector.
///
/// Serializes without the filter predicate (a closure has no textual form);
/// the serialized shape is what the export document embeds.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectorOptions {
    /// Record every call. Ignored when `filter` is set.
    pub capture_all: bool,
    /// Attach a best-effort call-site description to each entry.
    pub include_stack_trace: bool,
    /// Eviction bound; zero disables it.
    pub max_logs: usize,
    pub timestamp_format: TimestampFormat,
    #[serde(skip)]
    pub filter: Option<LogFilter>,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            capture_all: true,
            include_stack_trace: false,
            max_logs: 1000,
            timestamp_format: TimestampFormat::Iso,
            filter: None,
        }
    }
}

impl fmt::Debug for CollectorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectorOptions")
            .field("capture_all", &self.capture_all)
            .field("include_stack_trace", &self.include_stack_trace)
            .field("max_logs", &self.max_logs)
            .field("timestamp_format", &self.timestamp_format)
            .field("filter", &self.filter.as_ref().map(|_| "<predicate>"))
            .finish()
    }
}
