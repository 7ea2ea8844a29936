use std::path::PathBuf;

use thiserror::Error;

/// The main error type for nest operations
#[derive(Debug, Error)]
pub enum NestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Module descriptor error at {}: {message}", .path.display())]
    Descriptor { path: PathBuf, message: String },

    #[error("Project definition error at {}: {message}", .path.display())]
    Definition { path: PathBuf, message: String },

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] globset::Error),

    #[error("Failed to start {} after {attempts} attempt(s): {source}", .path.display())]
    DelegateStart {
        path: PathBuf,
        attempts: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("Path error: {0}")]
    Path(String),

    #[error("Schema error: {0}")]
    Schema(#[from] serde_json::Error),
}

/// Result type alias for nest operations
pub type NestResult<T> = Result<T, NestError>;
