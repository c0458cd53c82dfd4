use thiserror::Error;

#[derive(Debug, Error)]
pub enum MorphyxError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed input shapes: ragged rows, unknown genes, conflicting assignments.
    #[error("Shape error: {0}")]
    Shape(String),

    #[error("Ranking error: {0}")]
    Ranking(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, MorphyxError>;
