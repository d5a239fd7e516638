use std::fs;

use clap::Args;
use log::info;
use pkcs::{KeyType, der_to_pem, encode_public_key_as_der};

use crate::error::Result;
use crate::utils::{format_hex_dump, read_input};

#[derive(Args)]
pub(crate) struct Config {
    /// Path to the raw public key bytes. If not specified, reads from stdin
    file: Option<String>,

    /// Key algorithm (ec or rsa)
    #[arg(long)]
    key_type: KeyType,

    /// Key size in bits
    #[arg(long)]
    key_size: u32,

    /// Print the DER as a hex dump instead of PEM
    #[arg(long)]
    hex: bool,

    /// Also write the DER encoding to this file
    #[arg(long)]
    der_out: Option<String>,
}

pub(crate) fn execute(config: Config) -> Result<()> {
    let raw = read_input(config.file.as_deref())?;
    let der = encode_public_key_as_der(&raw, config.key_type, config.key_size)?;

    if let Some(path) = &config.der_out {
        fs::write(path, &der)?;
        info!("wrote {} DER bytes to {}", der.len(), path);
    }

    if config.hex {
        print!("{}", format_hex_dump(&der));
    } else {
        print!("{}", der_to_pem(&der));
    }

    Ok(())
}
