use thiserror::Error;

/// Failures while turning TLVs into [`crate::Element`]s and back.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("BOOLEAN content must be a single 0x00 or 0xff octet")]
    InvalidBoolean,

    #[error("{0}: empty content")]
    EmptyContent(&'static str),

    #[error("OBJECT IDENTIFIER: {0}")]
    InvalidObjectIdentifier(String),

    #[error("OBJECT IDENTIFIER: arcs {0}.{1} cannot start an identifier")]
    InvalidObjectIdentifierRoot(u64, u64),

    #[error("BIT STRING: {0} unused bits")]
    InvalidUnusedBits(u8),

    #[error("{0}: invalid character data")]
    InvalidString(&'static str),

    #[error("{0}: invalid time")]
    InvalidTime(&'static str),

    #[error("[{slot}]: {msg}")]
    InvalidContextSpecific { slot: u8, msg: String },

    #[error("{0} cannot be encoded")]
    ElementCannotEncode(&'static str),
}
