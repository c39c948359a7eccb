use thiserror::Error;

/// Errors raised around camera models.
///
/// Projection itself never fails; these cover configuration, factories,
/// parameter blocks and the optional finite-result checks.
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("unknown camera entity id: {0}")]
    UnknownEntity(String),
    #[error("invalid camera parameters: {0}")]
    InvalidParams(String),
    #[error("expected parameter block of length {expected}, got {actual}")]
    BlockLength { expected: usize, actual: usize },
    #[error("non-finite {0} result")]
    NonFinite(&'static str),
    #[error("camera config: {0}")]
    Config(#[from] serde_json::Error),
}
