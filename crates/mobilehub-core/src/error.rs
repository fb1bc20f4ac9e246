use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid placeholder: {0}")]
    InvalidPlaceholder(String),

    #[error("missing required field: {0}")]
    MissingField(String),
}
