//! Error type shared by the key library and the module layer.

/// Errors surfaced by key handling and module operations.
#[derive(Debug, thiserror::Error)]
pub enum LibsignalError {
    #[error("invalid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },
    #[error("bad key type: {0:#04x}")]
    BadKeyType(u8),
    #[error("invalid key: {0}")]
    InvalidKey(&'static str),
    #[error("invalid signature")]
    InvalidSignature,
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
    #[error("config error: {0}")]
    Config(String),
    #[error("worker task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl LibsignalError {
    /// Rejection code handed across the module boundary.
    pub fn code(&self) -> &'static str {
        match self {
            LibsignalError::InvalidBase64(_)
            | LibsignalError::InvalidKeyLength { .. }
            | LibsignalError::BadKeyType(_) => "ERR_INVALID_ARGUMENT",
            LibsignalError::NotImplemented(_) => "ERR_NOT_IMPLEMENTED",
            _ => "LIBSIGNAL_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, LibsignalError>;
