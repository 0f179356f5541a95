//! Error types for the recorder

use thiserror::Error;

use crate::port::PortError;

pub type Result<T> = std::result::Result<T, RecorderError>;

#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("DOM error: {0}")]
    Dom(#[from] dom::DomError),

    #[error("Port error: {0}")]
    Port(#[from] PortError),

    #[error("Invalid page URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}
