use crate::config::CollectorOptions;
use crate::console::{Console, LogSink};
use crate::error::CollectorError;
use crate::export;
use crate::types::{LogBuffer, LogEntry, LogLevel, LogMessage, LogStats};
use log::{debug, warn};
use serde_json::Value;
use std::collections::BTreeMap;
use std::panic::Location;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Produces a synthetic trailing value appended to each captured record.
type Augment = Arc<dyn Fn() -> Value + Send + Sync>;

/// Intercepts console channels, records qualifying calls into a bounded
/// FIFO buffer, and forwards every call unchanged to the handler that was
/// installed when the collector was constructed.
///
/// The original handlers are snapshotted once, at construction, so `stop()`
/// always restores them exactly even if other code swapped a channel while
/// the collector was active.
pub struct LogCollector {
    console: Arc<Console>,
    buffer: Arc<Mutex<LogBuffer>>,
    options: CollectorOptions,
    augment: Option<Augment>,
    originals: Vec<(LogLevel, Arc<dyn LogSink>)>,
    active: bool,
}

impl LogCollector {
    /// Intercepts all five channels.
    pub fn new(console: Arc<Console>, options: CollectorOptions) -> Self {
        Self::for_channels(console, options, &LogLevel::ALL)
    }

    /// Intercepts only the `error` channel; every other channel is left
    /// untouched for the collector's entire lifetime.
    pub fn error_only(console: Arc<Console>, options: CollectorOptions) -> Self {
        Self::for_channels(console, options, &[LogLevel::Error])
    }

    /// Captures only calls where some argument is a string containing
    /// `marker`; otherwise identical to [`LogCollector::new`].
    pub fn tagged(console: Arc<Console>, marker: &str) -> Self {
        let marker = marker.to_string();
        let options = CollectorOptions {
            capture_all: false,
            filter: Some(Arc::new(move |args: &[Value]| {
                args.iter()
                    .any(|value| matches!(value, Value::String(text) if text.contains(&marker)))
            })),
            ..CollectorOptions::default()
        };
        Self::for_channels(console, options, &LogLevel::ALL)
    }

    /// Appends elapsed milliseconds since construction to every captured
    /// record, with call-site capture on by default.
    pub fn timed(console: Arc<Console>) -> Self {
        let started = Instant::now();
        let mut collector = Self::for_channels(
            console,
            CollectorOptions {
                include_stack_trace: true,
                ..CollectorOptions::default()
            },
            &LogLevel::ALL,
        );
        collector.augment = Some(Arc::new(move || {
            Value::from(started.elapsed().as_millis() as u64)
        }));
        collector
    }

    fn for_channels(
        console: Arc<Console>,
        options: CollectorOptions,
        channels: &[LogLevel],
    ) -> Self {
        // Snapshot before any interception begins.
        let originals = channels
            .iter()
            .map(|&level| (level, console.snapshot(level)))
            .collect();
        let buffer = Arc::new(Mutex::new(LogBuffer::new(options.max_logs)));
        Self {
            console,
            buffer,
            options,
            augment: None,
            originals,
            active: false,
        }
    }

    /// Begins interception. Clears the buffer and counter, then installs a
    /// recording handler on each intercepted channel that records per the
    /// capture policy and forwards the call unchanged to the handler
    /// snapshotted at construction.
    ///
    /// Calling while already active warns and leaves all state untouched.
    pub fn start(&mut self) {
        if self.active {
            warn!("log collector is already active, start ignored");
            return;
        }
        self.buffer.lock().unwrap().clear();
        for (level, original) in &self.originals {
            let recorder = RecordingSink {
                forward: Arc::clone(original),
                buffer: Arc::clone(&self.buffer),
                options: self.options.clone(),
                augment: self.augment.clone(),
            };
            self.console.swap(*level, Arc::new(recorder));
        }
        self.active = true;
        debug!("log collector intercepting {} channel(s)", self.originals.len());
    }

    /// Ends interception, writing back the construction-time snapshot on
    /// every intercepted channel. No-op when inactive.
    pub fn stop(&mut self) {
        if !self.active {
            return;
        }
        for (level, original) in &self.originals {
            self.console.swap(*level, Arc::clone(original));
        }
        self.active = false;
        debug!("log collector stopped");
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Full buffer in capture order.
    pub fn logs(&self) -> Vec<LogEntry> {
        self.buffer.lock().unwrap().snapshot()
    }

    /// Entries on `level`, original order preserved.
    pub fn logs_by_level(&self, level: LogLevel) -> Vec<LogEntry> {
        self.logs()
            .into_iter()
            .filter(|entry| entry.level == level)
            .collect()
    }

    /// Entries whose timestamp string falls within `[start, end]`,
    /// compared lexicographically on the stored representation. Only
    /// well-defined for the `iso` format; epoch strings of differing digit
    /// width order arbitrarily.
    pub fn logs_by_time_range(&self, start: &str, end: &str) -> Vec<LogEntry> {
        self.logs()
            .into_iter()
            .filter(|entry| entry.timestamp.as_str() >= start && entry.timestamp.as_str() <= end)
            .collect()
    }

    /// Entries whose message contains `term`, case-insensitively.
    pub fn search(&self, term: &str) -> Vec<LogEntry> {
        let needle = term.to_lowercase();
        self.logs()
            .into_iter()
            .filter(|entry| {
                entry
                    .message
                    .to_search_text()
                    .to_lowercase()
                    .contains(&needle)
            })
            .collect()
    }

    pub fn stats(&self) -> LogStats {
        let entries = self.logs();
        let mut by_level = BTreeMap::new();
        for entry in &entries {
            *by_level.entry(entry.level.as_str().to_string()).or_insert(0) += 1;
        }
        LogStats {
            total: entries.len(),
            by_level,
            earliest: entries.first().map(|entry| entry.timestamp.clone()),
            latest: entries.last().map(|entry| entry.timestamp.clone()),
        }
    }

    /// Export document with metadata and the full buffer, as JSON text.
    pub fn export_json(&self) -> Result<String, CollectorError> {
        export::export_json(&self.options, self.logs())
    }

    /// Empties the buffer and resets the id counter. Active state is
    /// unaffected.
    pub fn clear(&self) {
        self.buffer.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.buffer.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.lock().unwrap().is_empty()
    }
}

impl Drop for LogCollector {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The handler installed while a collector is active: records per the
/// capture policy, then forwards the untouched arguments to the original
/// handler.
struct RecordingSink {
    forward: Arc<dyn LogSink>,
    buffer: Arc<Mutex<LogBuffer>>,
    options: CollectorOptions,
    augment: Option<Augment>,
}

impl RecordingSink {
    fn capture(&self, level: LogLevel, args: &[Value], origin: Option<&'static Location<'static>>) {
        let accepted = match &self.options.filter {
            Some(filter) => filter(args),
            None => self.options.capture_all,
        };
        if !accepted {
            return;
        }
        let mut values = args.to_vec();
        if let Some(augment) = &self.augment {
            values.push(augment());
        }
        let message = LogMessage::from_values(values);
        let timestamp = self.options.timestamp_format.render_now();
        let source = if self.options.include_stack_trace {
            origin.map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
        } else {
            None
        };
        self.buffer.lock().unwrap().push(timestamp, level, message, source);
    }
}

impl LogSink for RecordingSink {
    fn emit(&self, level: LogLevel, args: &[Value], origin: Option<&'static Location<'static>>) {
        self.capture(level, args, origin);
        self.forward.emit(level, args, origin);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn quiet_console() -> Arc<Console> {
        // Swap in a do-nothing handler so tests don't write to the terminal.
        struct NullSink;
        impl LogSink for NullSink {
            fn emit(&self, _: LogLevel, _: &[Value], _: Option<&'static Location<'static>>) {}
        }
        let console = Arc::new(Console::new());
        for level in LogLevel::ALL {
            console.swap(level, Arc::new(NullSink));
        }
        console
    }

    #[test]
    fn filter_is_the_sole_gate_when_present() {
        let console = quiet_console();
        let options = CollectorOptions {
            capture_all: true,
            filter: Some(Arc::new(|args: &[Value]| {
                args.first().map(|v| v == &json!("keep")).unwrap_or(false)
            })),
            ..CollectorOptions::default()
        };
        let mut collector = LogCollector::new(console.clone(), options);
        collector.start();

        console.log(&[json!("keep")]);
        console.log(&[json!("drop")]);

        let logs = collector.logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].message, LogMessage::Single(json!("keep")));
    }

    #[test]
    fn capture_all_false_without_filter_records_nothing() {
        let console = quiet_console();
        let options = CollectorOptions {
            capture_all: false,
            ..CollectorOptions::default()
        };
        let mut collector = LogCollector::new(console.clone(), options);
        collector.start();

        console.log(&[json!("a")]);
        console.error(&[json!("b")]);

        assert!(collector.is_empty());
    }

    #[test]
    fn augment_reaches_the_record_but_not_the_forwarded_args() {
        let console = quiet_console();
        let mut collector = LogCollector::timed(console.clone());
        collector.start();

        console.log(&[json!("tick")]);

        let logs = collector.logs();
        match &logs[0].message {
            LogMessage::Sequence(values) => {
                assert_eq!(values[0], json!("tick"));
                assert!(values[1].is_number());
            }
            other => panic!("expected a sequence, got {other:?}"),
        }
        assert!(logs[0].source.is_some());
    }

    #[test]
    fn stats_count_only_present_levels() {
        let console = quiet_console();
        let mut collector = LogCollector::new(console.clone(), CollectorOptions::default());
        collector.start();

        console.log(&[json!("one")]);
        console.log(&[json!("two")]);
        console.warn(&[json!("three")]);

        let stats = collector.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_level.get("log"), Some(&2));
        assert_eq!(stats.by_level.get("warn"), Some(&1));
        assert!(!stats.by_level.contains_key("error"));
        assert!(stats.earliest.is_some());
        assert!(stats.latest.is_some());
    }

    #[test]
    fn stats_on_an_empty_buffer_have_no_bounds() {
        let console = quiet_console();
        let collector = LogCollector::new(console, CollectorOptions::default());
        let stats = collector.stats();
        assert_eq!(stats.total, 0);
        assert!(stats.earliest.is_none());
        assert!(stats.latest.is_none());
    }

    #[test]
    fn dropping_an_active_collector_restores_the_snapshot() {
        let console = quiet_console();
        let original = console.snapshot(LogLevel::Log);
        {
            let mut collector = LogCollector::new(console.clone(), CollectorOptions::default());
            collector.start();
            assert!(!Arc::ptr_eq(&console.snapshot(LogLevel::Log), &original));
        }
        assert!(Arc::ptr_eq(&console.snapshot(LogLevel::Log), &original));
    }
}
