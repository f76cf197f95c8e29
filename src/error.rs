use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("export serialization error: {0}")]
    Export(#[from] serde_json::Error),
}
