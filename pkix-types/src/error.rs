//! Error types for PKIX types

use thiserror::Error;

/// Result type for PKIX types operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    // AlgorithmIdentifier errors
    #[error("AlgorithmIdentifier: expected SEQUENCE")]
    AlgorithmIdentifierExpectedSequence,
    #[error("AlgorithmIdentifier: empty SEQUENCE")]
    AlgorithmIdentifierEmpty,
    #[error("AlgorithmIdentifier: expected OBJECT IDENTIFIER for algorithm")]
    AlgorithmIdentifierExpectedOid,
    #[error("AlgorithmIdentifier: expected 1 or 2 elements, got {0}")]
    AlgorithmIdentifierInvalidElementCount(usize),

    // Parameter errors
    #[error("NULL parameters carry no typed value")]
    NullParameterNotSupported,
    #[error("EC parameters: expected namedCurve OBJECT IDENTIFIER")]
    EcParametersExpectedNamedCurve,
    #[error("EC parameters: unknown curve {0}")]
    UnknownNamedCurve(String),

    // SubjectPublicKeyInfo errors
    #[error("SubjectPublicKeyInfo: expected SEQUENCE")]
    SubjectPublicKeyInfoExpectedSequence,
    #[error("SubjectPublicKeyInfo: expected BIT STRING for subject public key")]
    SubjectPublicKeyInfoExpectedBitString,
    #[error("SubjectPublicKeyInfo: expected 2 elements, got {0}")]
    SubjectPublicKeyInfoInvalidElementCount(usize),

    /// ASN.1 encoding/decoding error
    #[error("ASN.1 error: {0}")]
    ASN1Error(#[from] asn1::error::Error),
}
