//! Public key formats for keys handed out by a secure key store.
//!
//! - [`encoder`]: raw key bytes to `SubjectPublicKeyInfo` DER and `PUBLIC KEY` PEM
//! - [`pkcs1`]: the PKCS#1 `RSAPublicKey` carried inside RSA key bits
//! - [`public_key`]: [`PublicKeyHandle`], a validated public key ready for use
//! - [`storage`]: the secure-storage boundary and the export workflow built on it

pub mod encoder;
pub mod error;
pub mod pkcs1;
pub mod public_key;
pub mod storage;

pub use encoder::{
    KEY_SPECS, KeyParameters, KeySpec, KeyType, der_to_pem, encode_public_key_as_der,
};
pub use error::{EncodeError, Error, Result};
pub use public_key::{KeyDetails, PublicKeyHandle};
