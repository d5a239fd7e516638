use base64::DecodeError;
use thiserror::Error;

/// Errors that can occur when parsing or decoding PEM data.
///
/// PEM parsing follows RFC 7468 and requires proper boundary markers,
/// valid base64 encoding, and matching labels.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Missing the opening boundary marker (e.g., `-----BEGIN PUBLIC KEY-----`)
    #[error("missing a pre encapsulation boundary")]
    MissingPreEncapsulationBoundary,

    /// Missing the closing boundary marker (e.g., `-----END PUBLIC KEY-----`)
    #[error("missing a post encapsulation boundary")]
    MissingPostEncapsulationBoundary,

    /// No data found between boundary markers
    #[error("missing PEM data")]
    MissingData,

    /// The label in the boundary marker is not recognized
    #[error("invalid label")]
    InvalidLabel,

    /// The BEGIN and END labels do not match
    #[error("label doesn't match")]
    LabelMissMatch,

    #[error("invalid encapsulation boundary")]
    InvalidEncapsulationBoundary,

    /// A line between the boundaries holds something other than base64
    #[error("invalid base64line")]
    InvalidBase64Line,

    /// Padding appeared before the last data line
    #[error("invalid base64finl")]
    InvalidBase64Finl,

    #[error("base64 decode: {0}")]
    Base64Decode(DecodeError),
}
