use crate::config::ConfigError;
use crate::entity::EntityKind;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Not a path: {0:?}")]
    UnsupportedEntity(EntityKind),

    #[error("Invalid pixel size {0} (must be finite and > 0)")]
    InvalidScale(f64),

    #[error("Encoding error: {0}")]
    EncodingFailure(String),

    #[error("Decode error: {0}")]
    DecodeFailure(String),

    #[error("Invalid render config: {0}")]
    Config(#[from] ConfigError),
}

impl From<png::EncodingError> for RenderError {
    fn from(e: png::EncodingError) -> Self {
        RenderError::EncodingFailure(e.to_string())
    }
}
