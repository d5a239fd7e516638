use pem::Label;
use thiserror::Error;

/// Failures of [`crate::extract_public_key_handle`].
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("malformed certificate: {0}")]
    MalformedCertificate(String),

    #[error("unsupported key algorithm: {0}")]
    UnsupportedKeyAlgorithm(String),
}

impl From<Error> for ExtractError {
    fn from(err: Error) -> Self {
        ExtractError::MalformedCertificate(err.to_string())
    }
}

impl From<pkcs::Error> for ExtractError {
    fn from(err: pkcs::Error) -> Self {
        match err {
            pkcs::Error::UnsupportedKeyAlgorithm(algorithm) => {
                ExtractError::UnsupportedKeyAlgorithm(algorithm)
            }
            other => ExtractError::MalformedCertificate(other.to_string()),
        }
    }
}

/// Structural errors while reading a certificate.
#[derive(Debug, Error)]
pub enum Error {
    #[error("ASN.1 error: {0}")]
    Asn1(#[from] asn1::error::Error),
    #[error("DER error: {0}")]
    Der(#[from] der::error::Error),
    #[error("PEM error: {0}")]
    Pem(#[from] pem::error::Error),
    #[error(transparent)]
    PKIXTypes(#[from] pkix_types::Error),
    #[error("no certificate in input")]
    EmptyAsn1Object,
    #[error("unexpected data after the certificate")]
    TrailingData,
    #[error("unexpected PEM label {0}, expected CERTIFICATE")]
    UnexpectedPemLabel(Label),
    #[error("invalid certificate: {0}")]
    InvalidCertificate(String),
    #[error("invalid TBSCertificate: {0}")]
    InvalidTBSCertificate(String),
    #[error("invalid version: {0}")]
    InvalidVersion(String),
    #[error("invalid certificate serial number: {0}")]
    InvalidCertificateSerialNumber(String),
    #[error("invalid name: {0}")]
    InvalidName(String),
    #[error("invalid relative distinguished name: {0}")]
    InvalidRelativeDistinguishedName(String),
    #[error("invalid attribute type and value: {0}")]
    InvalidAttributeTypeAndValue(String),
    #[error("invalid validity: {0}")]
    InvalidValidity(String),
}

pub type Result<T> = std::result::Result<T, Error>;
