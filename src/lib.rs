//! # logtrap
//!
//! In-process console-log interception and collection.
//!
//! This crate provides:
//! - A host logging surface with swappable per-channel handlers ([`Console`])
//! - Record-then-forward interception over a bounded FIFO buffer
//!   ([`LogCollector`])
//! - Read-only queries, stats, and JSON export over captured entries
//! - Presets for error-only, marker-tagged, and timed capture
//!
//! ```
//! use logtrap::{CollectorOptions, Console, LogCollector};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let console = Arc::new(Console::new());
//! let mut collector = LogCollector::new(console.clone(), CollectorOptions::default());
//! collector.start();
//! console.log(&[json!("hello")]);
//! assert_eq!(collector.logs().len(), 1);
//! collector.stop();
//! ```

pub mod collector;
pub mod config;
pub mod console;
pub mod error;
pub mod export;
pub mod types;

pub use collector::LogCollector;
pub use config::{CollectorOptions, LogFilter, TimestampFormat};
pub use console::{Console, LogSink, TermSink};
pub use error::CollectorError;
pub use export::{ExportDocument, ExportMetadata};
pub use types::{LogBuffer, LogEntry, LogLevel, LogMessage, LogStats};
