//! Boundary to a platform secure key store and the public key export
//! workflow built on top of it.
//!
//! The store itself (keychain, keystore, HSM) generates and keeps the key
//! pairs; this crate only ever sees the public half as raw bytes.

use log::{debug, info};
use pem::Pem;
use thiserror::Error;

use crate::encoder::{KeyType, der_to_pem, encode_public_key_as_der};
use crate::error::EncodeError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("no key pair stored under tag '{tag}'")]
    NotFound { tag: String },

    #[error("key pair generation failed: {0}")]
    GenerationFailed(String),

    #[error("key pair deletion failed: {0}")]
    DeletionFailed(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("failed to encode public key: {0}")]
    Encode(#[from] EncodeError),
}

/// A secure key store addressed by application tags.
///
/// Calls are synchronous; callers that must not block run them on a
/// worker of their choosing.
pub trait SecureStorage {
    /// Generates a key pair and stores it under `tag`.
    fn generate_key_pair(
        &mut self,
        tag: &str,
        key_type: KeyType,
        key_size_bits: u32,
    ) -> Result<(), StorageError>;

    /// Raw public key bytes of the pair stored under `tag`, if any.
    fn fetch_public_key_bytes(&self, tag: &str, key_type: KeyType) -> Option<Vec<u8>>;

    fn delete_key_pair(&mut self, tag: &str, key_type: KeyType) -> Result<(), StorageError>;
}

/// Tag for the `key_type` pair of an application, e.g. `com.example.keys.EC`.
pub fn key_tag(prefix: &str, key_type: KeyType) -> String {
    format!("{prefix}.{key_type}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedPublicKey {
    raw: Vec<u8>,
    der: Vec<u8>,
    pem: Pem,
    generated: bool,
}

impl ExportedPublicKey {
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    pub fn pem(&self) -> &Pem {
        &self.pem
    }

    /// Whether the pair had to be generated by this export.
    pub fn was_generated(&self) -> bool {
        self.generated
    }
}

/// Exports the public key stored under `tag`, generating the pair first if
/// the store has none.
///
/// # Errors
///
/// - [`StorageError::GenerationFailed`] if the store could not generate a pair
/// - [`StorageError::NotFound`] if generation reported success but the key
///   still cannot be fetched
/// - [`ExportError::Encode`] if the stored bytes cannot be wrapped
pub fn export_public_key<S: SecureStorage + ?Sized>(
    storage: &mut S,
    tag: &str,
    key_type: KeyType,
    key_size_bits: u32,
) -> Result<ExportedPublicKey, ExportError> {
    debug!("fetching {key_type} public key for tag {tag}");
    let (raw, generated) = match storage.fetch_public_key_bytes(tag, key_type) {
        Some(raw) => (raw, false),
        None => {
            info!("no key pair under {tag}, generating {key_type}-{key_size_bits}");
            storage.generate_key_pair(tag, key_type, key_size_bits)?;
            let raw = storage
                .fetch_public_key_bytes(tag, key_type)
                .ok_or_else(|| StorageError::NotFound {
                    tag: tag.to_string(),
                })?;
            (raw, true)
        }
    };
    debug!("encoding {} raw public key bytes", raw.len());

    let der = encode_public_key_as_der(&raw, key_type, key_size_bits)?;
    let pem = der_to_pem(&der);
    Ok(ExportedPublicKey {
        raw,
        der,
        pem,
        generated,
    })
}
