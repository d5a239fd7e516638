use pem::Label;
use thiserror::Error;

use crate::encoder::KeyType;

/// Failures of [`crate::encode_public_key_as_der`].
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("raw key bytes are empty")]
    EmptyInput,

    #[error("no algorithm registered for {key_type} {key_size_bits}-bit keys")]
    UnsupportedAlgorithm { key_type: KeyType, key_size_bits: u32 },

    #[error("raw key must be {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("raw key must start with 0x04 (uncompressed point), got 0x{0:02x}")]
    InvalidPointFormat(u8),

    #[error("ASN.1 error: {0}")]
    Asn1(#[from] asn1::error::Error),

    #[error("DER error: {0}")]
    Der(#[from] der::error::Error),

    #[error(transparent)]
    PKIXTypes(#[from] pkix_types::Error),
}

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

    #[error("PKCS#1 error: {0}")]
    Pkcs1(#[from] crate::pkcs1::Error),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("empty ASN1Object")]
    EmptyAsn1Object,

    #[error("unexpected data after the public key structure")]
    TrailingData,

    #[error("unexpected PEM label {0}, expected PUBLIC KEY")]
    UnexpectedPemLabel(Label),

    #[error("unsupported key algorithm: {0}")]
    UnsupportedKeyAlgorithm(String),

    #[error("subject public key declares {0} unused bits, key bits must be whole octets")]
    UnalignedKeyBits(u8),

    #[error("unknown key type '{0}', expected 'ec' or 'rsa'")]
    InvalidKeyType(String),
}

pub type Result<T> = std::result::Result<T, Error>;
