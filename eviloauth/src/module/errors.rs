use thiserror::Error;

use crate::utils::UtilError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModuleError {
    #[error("Module failed to load: {0}")]
    Load(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Unexpected response status: {0}")]
    Status(String),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Utils error: {0}")]
    Utils(String),
}

impl From<UtilError> for ModuleError {
    fn from(err: UtilError) -> Self {
        Self::Utils(err.to_string())
    }
}
