//! Central error types for flopscope.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlopscopeError {
    #[error("Config parse error: {0}")]
    ConfigParse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown model: '{0}'")]
    UnknownModel(String),

    #[error("Shape mismatch in {layer}: expected {expected}, got {actual}")]
    ShapeMismatch {
        layer: String,
        expected: String,
        actual: String,
    },

    #[error("Unsupported op '{op}' for input shape {shape:?}")]
    UnsupportedOp { op: String, shape: Vec<usize> },

    #[error("Report schema error: {0}")]
    ReportSchema(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
