use std::fmt::Write;

use clap::Args;
use keywrap::decoder::Decoder;
use log::{debug, warn};
use pem::ToPem;
use pkix_types::OidName;
use x509::{Certificate, ExtractError};

use crate::error::Result;
use crate::pubkey::inspect::KeyReport;
use crate::utils::{parse_pem, read_input, to_colon_hex};

const TIME_FORMAT: &str = "%b %d %H:%M:%S %Y GMT";

#[derive(Args)]
pub(crate) struct Config {
    /// Path to the certificate file (DER or PEM format). If not specified, reads from stdin
    file: Option<String>,
}

pub(crate) fn execute(config: Config) -> Result<()> {
    let input = read_input(config.file.as_deref())?;

    let cert: Certificate = match parse_pem(&input) {
        Some(pem) => {
            debug!("reading PEM certificate");
            let decoded: x509::Result<Certificate> = pem.decode();
            decoded.map_err(ExtractError::from)?
        }
        None => Certificate::from_der(&input).map_err(ExtractError::from)?,
    };
    let key = cert.public_key_handle()?;
    warn!("certificate trust was not evaluated");

    let tbs = cert.tbs_certificate();
    let signature = cert.signature_algorithm();
    let mut output = String::new();
    writeln!(output, "Subject: {}", tbs.subject())?;
    writeln!(output, "Issuer: {}", tbs.issuer())?;
    writeln!(
        output,
        "Serial: {}",
        to_colon_hex(&tbs.serial_number().to_unsigned_bytes_be())
    )?;
    writeln!(
        output,
        "Not Before: {}",
        tbs.validity().not_before().format(TIME_FORMAT)
    )?;
    writeln!(
        output,
        "Not After:  {}",
        tbs.validity().not_after().format(TIME_FORMAT)
    )?;
    match signature.oid_name() {
        Some(name) => writeln!(output, "Signature Algorithm: {}", name)?,
        None => writeln!(output, "Signature Algorithm: {}", signature.algorithm())?,
    }
    write!(output, "{}", KeyReport::new(&key))?;
    write!(output, "{}", key.to_pem()?)?;
    writeln!(
        output,
        "Note: trust not verified (signature, issuer chain and validity period are not checked)"
    )?;
    print!("{}", output);

    Ok(())
}
