pub mod error;

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use base64::{Engine, engine::general_purpose::STANDARD};
use error::Error;
use keywrap::decoder::{DecodableFrom, Decoder};
use regex::Regex;

const PUBLIC_KEY_LABEL: &str = "PUBLIC KEY";
const CERTIFICATE_LABEL: &str = "CERTIFICATE";

/// RFC 7468 section 2: generators wrap base64 text at 64 characters.
pub const LINE_WIDTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    /// X.509 SubjectPublicKeyInfo
    PublicKey,
    /// X.509 Certificate
    Certificate,
}

impl Display for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::PublicKey => write!(f, "{}", PUBLIC_KEY_LABEL),
            Label::Certificate => write!(f, "{}", CERTIFICATE_LABEL),
        }
    }
}

impl FromStr for Label {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            PUBLIC_KEY_LABEL => Ok(Label::PublicKey),
            CERTIFICATE_LABEL => Ok(Label::Certificate),
            _ => Err(Error::InvalidLabel),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    Begin(Label),
    End(Label),
}

impl Boundary {
    /// Returns `Ok(None)` for lines that are not boundaries at all.
    fn parse(line: &str) -> Result<Option<Boundary>, Error> {
        let re = Regex::new(r"^-----(BEGIN|END) ([A-Z0-9 ]+)-----\s*$")
            .map_err(|_| Error::InvalidEncapsulationBoundary)?;
        let Some(captured) = re.captures(line) else {
            return Ok(None);
        };
        let (Some(kind), Some(label)) = (captured.get(1), captured.get(2)) else {
            return Err(Error::InvalidEncapsulationBoundary);
        };
        let label = Label::from_str(label.as_str())?;
        match kind.as_str() {
            "BEGIN" => Ok(Some(Boundary::Begin(label))),
            _ => Ok(Some(Boundary::End(label))),
        }
    }
}

/*
ref: https://www.rfc-editor.org/rfc/rfc7468.html#section-3
*/

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pem {
    label: Label,
    base64_data: String, // base64 encoded data, no line breaks
}

impl Pem {
    pub fn new(label: Label, base64_data: String) -> Self {
        Pem { label, base64_data }
    }

    pub fn from_bytes(label: Label, data: &[u8]) -> Self {
        let base64_data = STANDARD.encode(data);
        Pem { label, base64_data }
    }

    pub fn label(&self) -> Label {
        self.label
    }

    pub fn data(&self) -> &str {
        &self.base64_data
    }
}

impl Display for Pem {
    /// Writes the block exactly as generators emit it: both boundaries and
    /// every body line terminated by `\n`, body lines at most 64 characters.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "-----BEGIN {}-----", self.label)?;
        for chunk in self.base64_data.as_bytes().chunks(LINE_WIDTH) {
            let line = std::str::from_utf8(chunk).map_err(|_| std::fmt::Error)?;
            writeln!(f, "{}", line)?;
        }
        writeln!(f, "-----END {}-----", self.label)
    }
}

/// Trait for types that can be converted to PEM format
pub trait ToPem {
    type Error;

    fn pem_label(&self) -> Label;

    fn to_pem(&self) -> Result<Pem, Self::Error>;
}

impl DecodableFrom<Pem> for Vec<u8> {}

impl Decoder<Pem, Vec<u8>> for Pem {
    type Error = Error;

    fn decode(&self) -> Result<Vec<u8>, Self::Error> {
        // This discards label information from Pem format.
        STANDARD.decode(self.data()).map_err(Error::Base64Decode)
    }
}

impl DecodableFrom<String> for Pem {}

impl Decoder<String, Pem> for String {
    type Error = Error;

    fn decode(&self) -> Result<Pem, Self::Error> {
        Pem::from_str(self)
    }
}

impl DecodableFrom<&str> for Pem {}

impl Decoder<&str, Pem> for &str {
    type Error = Error;

    fn decode(&self) -> Result<Pem, Self::Error> {
        Pem::from_str(self)
    }
}

/*
* text -> pre-eb -> base64lines -> post-eb
*                       |_|    \-> base64finl -/
 */
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
enum PemParsingState {
    #[default]
    Init,
    Base64Lines,
    Base64Finl,
}

impl FromStr for Pem {
    type Err = Error;

    /// Parses the first PEM block in `s`. Explanatory text before the
    /// pre-encapsulation boundary is skipped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut state = PemParsingState::default();
        let mut label = None;
        let mut base64_data = String::new();

        for line in s.lines() {
            match state {
                PemParsingState::Init => {
                    if let Some(Boundary::Begin(l)) = Boundary::parse(line)? {
                        label = Some(l);
                        state = PemParsingState::Base64Lines;
                    }
                }
                PemParsingState::Base64Lines | PemParsingState::Base64Finl => {
                    match Boundary::parse(line)? {
                        Some(Boundary::End(l)) => {
                            if label != Some(l) {
                                return Err(Error::LabelMissMatch);
                            }
                            // RFC 7468 allows an empty body, which is what
                            // zero bytes of data encode to
                            return Ok(Pem {
                                label: l,
                                base64_data,
                            });
                        }
                        Some(Boundary::Begin(_)) => {
                            return Err(Error::MissingPostEncapsulationBoundary);
                        }
                        None => {}
                    }
                    let line = line.trim_end();
                    if line.is_empty() {
                        return Err(if base64_data.is_empty() {
                            Error::MissingData
                        } else {
                            Error::InvalidBase64Line
                        });
                    }
                    if state == PemParsingState::Base64Finl {
                        // only padding may follow a padded line
                        if !line.chars().all(|c| c == '=') {
                            return Err(Error::InvalidBase64Finl);
                        }
                    } else if !is_base64_line(line) {
                        return Err(Error::InvalidBase64Line);
                    } else if line.contains('=') {
                        state = PemParsingState::Base64Finl;
                    }
                    base64_data.push_str(line);
                }
            }
        }

        match state {
            PemParsingState::Init => Err(Error::MissingPreEncapsulationBoundary),
            _ => Err(Error::MissingPostEncapsulationBoundary),
        }
    }
}

fn is_base64_line(line: &str) -> bool {
    let data = line.trim_end_matches('=');
    line.len() - data.len() <= 2
        && data
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/')
}
