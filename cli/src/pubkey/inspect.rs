use std::fmt::{Display, Write};
use std::str::FromStr;

use clap::Args;
use keywrap::decoder::Decoder;
use log::debug;
use pem::Pem;
use pkcs::{KeyDetails, PublicKeyHandle};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::output::OutputFormat;
use crate::utils::{read_input, to_hex};

#[derive(Args)]
pub(crate) struct Config {
    /// Path to the PEM public key, or `-` to read from stdin
    file: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,
}

/// The decoded fields of a public key, as printed by `inspect`.
#[derive(Serialize)]
pub(crate) struct KeyReport {
    key_type: String,
    key_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    modulus: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exponent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    curve: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    x: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    y: Option<String>,
}

impl KeyReport {
    pub(crate) fn new(key: &PublicKeyHandle) -> Self {
        let mut report = KeyReport {
            key_type: key.key_type().to_string(),
            key_size: key.key_size_bits(),
            modulus: None,
            exponent: None,
            curve: None,
            x: None,
            y: None,
        };
        match key.details() {
            KeyDetails::Rsa {
                modulus,
                public_exponent,
            } => {
                report.modulus = Some(to_hex(&modulus.to_unsigned_bytes_be()));
                report.exponent = Some(public_exponent.to_string());
            }
            KeyDetails::Ec { curve, x, y } => {
                report.curve = Some(curve.to_string());
                report.x = Some(to_hex(x));
                report.y = Some(to_hex(y));
            }
        }
        report
    }
}

impl Display for KeyReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut output = String::new();
        writeln!(output, "Key type: {}", self.key_type)?;
        writeln!(output, "Key size: {} bits", self.key_size)?;
        let fields = [
            ("Modulus", &self.modulus),
            ("Exponent", &self.exponent),
            ("Curve", &self.curve),
            ("X", &self.x),
            ("Y", &self.y),
        ];
        for (label, value) in fields {
            if let Some(value) = value {
                writeln!(output, "{}: {}", label, value)?;
            }
        }
        write!(f, "{}", output)
    }
}

pub(crate) fn execute(config: Config) -> Result<()> {
    let input = read_input(Some(&config.file))?;
    let text = String::from_utf8(input)
        .map_err(|_| Error::InvalidInput("expected a PEM public key".to_string()))?;

    let pem = Pem::from_str(&text)?;
    let key: PublicKeyHandle = pem.decode()?;
    debug!(
        "decoded {} {}-bit public key",
        key.key_type(),
        key.key_size_bits()
    );

    let report = KeyReport::new(&key);
    match config.output {
        OutputFormat::Text => print!("{}", report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}
