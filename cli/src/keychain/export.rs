use std::fs;

use clap::Args;
use log::info;
use pkcs::KeyType;
use pkcs::storage::{export_public_key, key_tag};

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

    /// Key size in bits
    #[arg(long)]
    key_size: u32,

    /// Also write the DER encoding to this file
    #[arg(long)]
    der_out: Option<String>,
}

pub(crate) fn execute(config: Config) -> Result<()> {
    validate_tag(&config.tag)?;
    let tag = key_tag(&config.tag, config.key_type);
    let mut storage = DirectoryStorage::new(&config.dir);

    let exported = export_public_key(&mut storage, &tag, config.key_type, config.key_size)?;
    if exported.was_generated() {
        info!("generated a new key pair for {}", tag);
    }

    if let Some(path) = &config.der_out {
        fs::write(path, exported.der())?;
        info!("wrote {} DER bytes to {}", exported.der().len(), path);
    }
    print!("{}", exported.pem());

    Ok(())
}
