use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackError {
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Shadow index {index} out of range for snapshot of {len} slots")]
    ShadowIndexOutOfRange { index: usize, len: usize },

    #[error("Member '{0}' has no shadow index")]
    MissingShadowIndex(String),

    #[error("Entity type '{0}' has no shadow value storage")]
    NoShadowStorage(String),

    #[error("Entry for entity type '{0}' has no backing object")]
    NoBackingObject(String),

    #[error("Entity type '{entity_type}' expects a {expected} object, got {actual}")]
    BackingObjectMismatch {
        entity_type: String,
        expected: String,
        actual: String,
    },

    #[error("Shadow-state entity type '{0}' cannot have a backing object")]
    UnexpectedBackingObject(String),

    #[error("Member '{0}' not found on '{1}'")]
    MemberNotFound(String, String),

    #[error("Unsupported collection element type: {0}")]
    UnsupportedElementType(String),

    #[error("Value buffer index {index} out of range for buffer of {len} values")]
    ValueBufferIndex { index: usize, len: usize },

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Lock error: {0}")]
    LockError(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TrackError>;

impl<T> From<std::sync::PoisonError<T>> for TrackError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}

impl From<serde_json::Error> for TrackError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}
