use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use log::debug;
use pkcs::KeyType;
use pkcs::storage::{SecureStorage, StorageError};

/// A key store backed by a directory of raw public keys, one `<tag>.pub`
/// file per pair.
///
/// Key pairs are created by the platform key store that owns the private
/// half, so generation always fails here.
pub(crate) struct DirectoryStorage {
    dir: PathBuf,
}

impl DirectoryStorage {
    pub(crate) fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn key_path(&self, tag: &str) -> PathBuf {
        self.dir.join(format!("{tag}.pub"))
    }
}

impl SecureStorage for DirectoryStorage {
    fn generate_key_pair(
        &mut self,
        tag: &str,
        key_type: KeyType,
        key_size_bits: u32,
    ) -> Result<(), StorageError> {
        Err(StorageError::GenerationFailed(format!(
            "{key_type}-{key_size_bits} key pairs are generated by the platform key store; \
             place the raw public key at {}",
            self.key_path(tag).display()
        )))
    }

    fn fetch_public_key_bytes(&self, tag: &str, _key_type: KeyType) -> Option<Vec<u8>> {
        let path = self.key_path(tag);
        match fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                debug!("cannot read {}: {}", path.display(), err);
                None
            }
        }
    }

    fn delete_key_pair(&mut self, tag: &str, _key_type: KeyType) -> Result<(), StorageError> {
        match fs::remove_file(self.key_path(tag)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(StorageError::NotFound {
                tag: tag.to_string(),
            }),
            Err(err) => Err(StorageError::DeletionFailed(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_directory_storage() {
        let dir = tempdir().unwrap();
        let mut storage = DirectoryStorage::new(dir.path());

        assert_eq!(None, storage.fetch_public_key_bytes("app.EC", KeyType::Ec));
        assert!(matches!(
            storage.generate_key_pair("app.EC", KeyType::Ec, 256),
            Err(StorageError::GenerationFailed(_))
        ));

        fs::write(dir.path().join("app.EC.pub"), [0x04, 0x01]).unwrap();
        assert_eq!(
            Some(vec![0x04, 0x01]),
            storage.fetch_public_key_bytes("app.EC", KeyType::Ec)
        );

        storage.delete_key_pair("app.EC", KeyType::Ec).unwrap();
        assert_eq!(
            Err(StorageError::NotFound {
                tag: "app.EC".to_string()
            }),
            storage.delete_key_pair("app.EC", KeyType::Ec)
        );
    }
}
