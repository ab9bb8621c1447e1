use thiserror::Error;

/// Every failure an intent, task or engine function can report.
#[derive(Error, Debug)]
pub enum BankError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Slot '{slot}' is busy")]
    Busy { slot: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    #[error("Export failed at {path}: {reason}")]
    Export { path: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl BankError {
    pub fn export(path: impl AsRef<std::path::Path>, reason: impl std::fmt::Display) -> Self {
        Self::Export {
            path: path.as_ref().display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Short stable name of the error kind, used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "ConfigError",
            Self::Precondition(_) => "PreconditionError",
            Self::Busy { .. } => "Busy",
            Self::Cancelled => "Cancelled",
            Self::EmptyDataset(_) => "EmptyDatasetError",
            Self::Export { .. } => "ExportError",
            Self::Serialization(_) | Self::Internal(_) => "Internal",
        }
    }
}

pub type BankResult<T> = Result<T, BankError>;
