use thiserror::Error;

#[derive(Debug, Error)]
pub enum EscolaError {
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Type mismatch for {parameter}: expected a number, got {found}")]
    TypeMismatch {
        parameter: &'static str,
        found: &'static str,
    },

    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Unknown demand type: {0}")]
    UnknownDemandType(String),

    #[error("Unknown priority: {0}")]
    UnknownPriority(String),

    #[error("Priority is locked at {0} for this demand")]
    PriorityLocked(crate::demand::Priority),

    #[error("No data available: {0}")]
    NoDataAvailable(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, EscolaError>;
