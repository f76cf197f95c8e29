use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt;

/// One of the five console channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Log,
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    /// Every channel, in dispatch-table order.
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Log,
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Log => "log",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }

    /// Index into the console's per-channel handler table.
    pub(crate) const fn slot(self) -> usize {
        match self {
            LogLevel::Log => 0,
            LogLevel::Error => 1,
            LogLevel::Warn => 2,
            LogLevel::Info => 3,
            LogLevel::Debug => 4,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Captured payload of a channel call: the lone argument when exactly one
/// was passed, otherwise the full ordered argument sequence.
///
/// Serializes untagged, so a single value appears as itself and a sequence
/// as an array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LogMessage {
    Single(Value),
    Sequence(Vec<Value>),
}

impl LogMessage {
    pub fn from_values(mut values: Vec<Value>) -> Self {
        if values.len() == 1 {
            LogMessage::Single(values.remove(0))
        } else {
            LogMessage::Sequence(values)
        }
    }

    /// Text rendering used by substring search: a string payload matches on
    /// its raw text, everything else on its compact JSON form.
    pub fn to_search_text(&self) -> String {
        match self {
            LogMessage::Single(Value::String(text)) => text.clone(),
            LogMessage::Single(value) => value.to_string(),
            LogMessage::Sequence(values) => Value::Array(values.clone()).to_string(),
        }
    }
}

/// A single captured channel call.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    /// Monotonically increasing, assigned at capture time in capture order.
    pub id: u64,
    /// ISO 8601 or epoch-millisecond string, per collector configuration.
    pub timestamp: String,
    pub level: LogLevel,
    pub message: LogMessage,
    /// Call-site description, present only when stack-trace capture is on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Bounded FIFO of captured entries. Owns the id counter so that ids stay
/// strictly increasing and contiguous within the retained window.
#[derive(Debug)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    counter: u64,
    max_size: usize,
}

impl LogBuffer {
    /// `max_size` of zero disables the bound.
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            counter: 0,
            max_size,
        }
    }

    /// Assigns the next id, appends, then evicts the oldest entry if the
    /// bound is exceeded. Returns the assigned id.
    pub fn push(
        &mut self,
        timestamp: String,
        level: LogLevel,
        message: LogMessage,
        source: Option<String>,
    ) -> u64 {
        self.counter += 1;
        self.entries.push_back(LogEntry {
            id: self.counter,
            timestamp,
            level,
            message,
            source,
        });
        if self.max_size > 0 && self.entries.len() > self.max_size {
            self.entries.pop_front();
        }
        self.counter
    }

    /// Owned copy of the buffer in capture order.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Empties the buffer and resets the id counter.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.counter = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Summary over the current buffer contents.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStats {
    pub total: usize,
    /// Counts keyed by level tag; only levels actually present appear.
    pub by_level: std::collections::BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earliest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest: Option<String>,
}
