use crate::config::CollectorOptions;
use crate::error::CollectorError;
use crate::types::LogEntry;
use chrono::Utc;
use serde::Serialize;

/// Export metadata; field names are the contract of the export format.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub export_time: String,
    pub total_logs: usize,
    pub collector_options: CollectorOptions,
}

/// The full export document: metadata plus the ordered entry buffer.
#[derive(Debug, Serialize)]
pub struct ExportDocument {
    pub metadata: ExportMetadata,
    pub logs: Vec<LogEntry>,
}

pub fn export_json(
    options: &CollectorOptions,
    logs: Vec<LogEntry>,
) -> Result<String, CollectorError> {
    let document = ExportDocument {
        metadata: ExportMetadata {
            export_time: Utc::now().to_rfc3339(),
            total_logs: logs.len(),
            collector_options: options.clone(),
        },
        logs,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LogLevel, LogMessage};
    use serde_json::{json, Value};

    #[test]
    fn document_shape_matches_the_contract() {
        let logs = vec![LogEntry {
            id: 1,
            timestamp: "2026-01-01T00:00:00+00:00".to_string(),
            level: LogLevel::Info,
            message: LogMessage::Single(json!("ready")),
            source: None,
        }];
        let text = export_json(&CollectorOptions::default(), logs).unwrap();
        let doc: Value = serde_json::from_str(&text).unwrap();

        assert!(doc["metadata"]["exportTime"].is_string());
        assert_eq!(doc["metadata"]["totalLogs"], json!(1));
        assert_eq!(doc["metadata"]["collectorOptions"]["maxLogs"], json!(1000));
        assert_eq!(doc["logs"][0]["id"], json!(1));
        assert_eq!(doc["logs"][0]["level"], json!("info"));
        assert_eq!(doc["logs"][0]["message"], json!("ready"));
        // Absent source is omitted, not null.
        assert!(doc["logs"][0].get("source").is_none());
    }
}
