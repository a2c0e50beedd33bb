use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON (de)serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Template rendering failed: {0}")]
    Template(#[from] askama::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Chart table not found (expected a table with bgcolor=\"{bgcolor}\")")]
    TableNotFound { bgcolor: String },

    #[error("Column header not found in chart table: {0}")]
    ColumnNotFound(String),

    #[error("Tempo value {tempo:?} does not start with a number")]
    InvalidTempo { tempo: String },
}

pub type Result<T> = std::result::Result<T, ChartError>;
