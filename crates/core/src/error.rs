use thiserror::Error;

pub type AdsheetResult<T> = Result<T, AdsheetError>;

#[derive(Error, Debug)]
pub enum AdsheetError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Spreadsheet error: {0}")]
    Sheet(String),

    #[error("Account error: {0}")]
    Account(String),

    #[error("Bid override error: {0}")]
    Override(String),

    #[error("Notification error: {0}")]
    Notify(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
