use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PEM decode error: {0}")]
    Pem(#[from] pem::error::Error),

    #[error("public key error: {0}")]
    Pkcs(#[from] pkcs::Error),

    #[error("encode error: {0}")]
    Encode(#[from] pkcs::EncodeError),

    #[error("export failed: {0}")]
    Export(#[from] pkcs::storage::ExportError),

    #[error("key storage error: {0}")]
    Storage(#[from] pkcs::storage::StorageError),

    #[error(transparent)]
    Extract(#[from] x509::ExtractError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;
