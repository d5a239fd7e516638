//! PKCS#1 (RFC 8017) RSA public keys.

pub mod error;
mod types;

pub use error::{Error, Result};
pub use types::RSAPublicKey;
