use crate::types::LogLevel;
use serde_json::Value;
use std::io::{self, Write};
use std::panic::Location;
use std::sync::{Arc, Mutex};

/// Handler installed on a console channel.
///
/// `origin` is the call site of the channel method when one is known;
/// handlers invoked directly may receive `None`.
pub trait LogSink: Send + Sync {
    fn emit(&self, level: LogLevel, args: &[Value], origin: Option<&'static Location<'static>>);
}

/// Host logging surface: five channels, each holding a swappable handler.
///
/// Channel calls dispatch through whatever handler is currently installed,
/// which is the indirection point collectors wrap. Only one interceptor
/// should own a channel at a time; when several collectors intercept the
/// same channel, the last `start()` wins and earlier instances restore to
/// the handler they snapshotted, not necessarily the true original.
pub struct Console {
    channels: Mutex<[Arc<dyn LogSink>; 5]>,
}

impl Console {
    /// A console with the terminal handler on every channel.
    pub fn new() -> Self {
        let term: Arc<dyn LogSink> = Arc::new(TermSink);
        Self {
            channels: Mutex::new(std::array::from_fn(|_| Arc::clone(&term))),
        }
    }

    #[track_caller]
    pub fn log(&self, args: &[Value]) {
        self.emit(LogLevel::Log, args);
    }

    #[track_caller]
    pub fn error(&self, args: &[Value]) {
        self.emit(LogLevel::Error, args);
    }

    #[track_caller]
    pub fn warn(&self, args: &[Value]) {
        self.emit(LogLevel::Warn, args);
    }

    #[track_caller]
    pub fn info(&self, args: &[Value]) {
        self.emit(LogLevel::Info, args);
    }

    #[track_caller]
    pub fn debug(&self, args: &[Value]) {
        self.emit(LogLevel::Debug, args);
    }

    /// Dispatch a call on `level`'s channel through the installed handler.
    #[track_caller]
    pub fn emit(&self, level: LogLevel, args: &[Value]) {
        let origin = Location::caller();
        let sink = {
            let channels = self.channels.lock().unwrap();
            Arc::clone(&channels[level.slot()])
        };
        sink.emit(level, args, Some(origin));
    }

    /// Install `sink` on `level`'s channel, returning the handler it
    /// replaced.
    pub fn swap(&self, level: LogLevel, sink: Arc<dyn LogSink>) -> Arc<dyn LogSink> {
        let mut channels = self.channels.lock().unwrap();
        std::mem::replace(&mut channels[level.slot()], sink)
    }

    /// The handler currently installed on `level`'s channel.
    pub fn snapshot(&self, level: LogLevel) -> Arc<dyn LogSink> {
        Arc::clone(&self.channels.lock().unwrap()[level.slot()])
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

/// Default handler: renders each call as one line of text, `error` and
/// `warn` to stderr, everything else to stdout.
pub struct TermSink;

impl LogSink for TermSink {
    fn emit(&self, level: LogLevel, args: &[Value], _origin: Option<&'static Location<'static>>) {
        let line = render_line(args);
        match level {
            LogLevel::Error | LogLevel::Warn => {
                let _ = writeln!(io::stderr(), "{line}");
            }
            _ => {
                let _ = writeln!(io::stdout(), "{line}");
            }
        }
    }
}

fn render_line(args: &[Value]) -> String {
    args.iter()
        .map(|value| match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
