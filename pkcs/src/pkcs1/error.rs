use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("ASN.1 error: {0}")]
    Asn1(#[from] asn1::error::Error),

    #[error("Invalid DER: {0}")]
    InvalidDer(#[from] der::error::Error),

    #[error("expected SEQUENCE")]
    ExpectedSequence,

    #[error("expected 2 elements, got {0}")]
    InvalidElementCount(usize),

    #[error("expected INTEGER for {field}")]
    ExpectedInteger { field: &'static str },

    #[error("{field} must be positive")]
    NotPositive { field: &'static str },

    #[error("expected exactly one RSAPublicKey structure")]
    UnexpectedStructureCount,
}

pub type Result<T> = std::result::Result<T, Error>;
