use thiserror::Error;

#[derive(Error, Debug)]
pub enum CipherForgeError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("State Persist Error: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),

    #[error("Capability Unavailable: {0}")]
    Capability(String),
}

pub type CfResult<T> = Result<T, CipherForgeError>;
