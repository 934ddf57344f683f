use std::path::PathBuf;

use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum PbirError {
    #[error("PbirError - invalid argument: {0}")]
    InvalidArgument(String),
    #[error("PbirError - invalid state: {0}")]
    InvalidState(String),
    #[error("PbirError - not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("PbirError - parse error in {}: {message}", path.display())]
    ParseError { path: PathBuf, message: String },
    #[error("PbirError - I/O error: {0}")]
    Io(String),
}

impl From<StoreError> for PbirError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(path) => PbirError::NotFound(path),
            StoreError::DeserializationError { path, message } => {
                PbirError::ParseError { path, message }
            }
            StoreError::SerializationError(message) => {
                PbirError::Io(format!("Cannot serialize metadata: {}", message))
            }
            StoreError::IoError(message) => PbirError::Io(message),
        }
    }
}
