use clap::Args;
use log::info;
use pkcs::KeyType;
use pkcs::storage::{SecureStorage, key_tag};

use super::{DirectoryStorage, validate_tag};
use crate::error::Result;

#[derive(Args)]
pub(crate) struct Config {
    /// Directory holding the stored public keys
    #[arg(long)]
    dir: String,

    /// Application tag; the key type is appended (`<tag>.EC`, `<tag>.RSA`)
    #[arg(long)]
    tag: String,

    /// Key algorithm (ec or rsa)
    #[arg(long)]
    key_type: KeyType,
}

pub(crate) fn execute(config: Config) -> Result<()> {
    validate_tag(&config.tag)?;
    let tag = key_tag(&config.tag, config.key_type);
    let mut storage = DirectoryStorage::new(&config.dir);

    storage.delete_key_pair(&tag, config.key_type)?;
    info!("deleted key pair {}", tag);
    println!("Deleted {}", tag);

    Ok(())
}
