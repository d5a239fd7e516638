//! Reading X.509 certificates far enough to use the key they carry.
//!
//! [`extract_public_key_handle`] decodes a DER certificate and turns its
//! `subjectPublicKeyInfo` into a [`PublicKeyHandle`]. The certificate model
//! keeps the fields needed to describe a certificate (serial, issuer,
//! subject, validity); extensions and unique identifiers are skipped.
//!
//! Nothing here evaluates trust: signatures, chains, validity periods and
//! revocation are never checked.

use std::str::FromStr;

use asn1::{ASN1Object, BitString, Element, Integer};
use chrono::NaiveDateTime;
use der::Der;
use keywrap::decoder::{DecodableFrom, Decoder};
use pem::{Label, Pem};
use pkcs::PublicKeyHandle;
use pkix_types::{AlgorithmIdentifier, SubjectPublicKeyInfo};

pub mod error;
mod name;

pub use error::{Error, ExtractError, Result};
pub use name::{AttributeTypeAndValue, Name, RelativeDistinguishedName};

/// Extracts the public key of a DER-encoded certificate.
///
/// The certificate is parsed, not verified: a handle is returned for
/// expired, self-signed or forged certificates alike.
///
/// # Errors
///
/// - [`ExtractError::MalformedCertificate`] if the bytes are not a DER
///   X.509 certificate (including truncated input and trailing bytes)
/// - [`ExtractError::UnsupportedKeyAlgorithm`] if the key algorithm, curve
///   or size is not one the encoder supports
pub fn extract_public_key_handle(
    certificate_der: &[u8],
) -> std::result::Result<PublicKeyHandle, ExtractError> {
    let certificate = Certificate::from_der(certificate_der)?;
    certificate.public_key_handle()
}

/*
https://datatracker.ietf.org/doc/html/rfc5280#section-4.1

Certificate  ::=  SEQUENCE  {
    tbsCertificate       TBSCertificate,
    signatureAlgorithm   AlgorithmIdentifier,
    signatureValue       BIT STRING
}
 */

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    tbs_certificate: TBSCertificate,
    signature_algorithm: AlgorithmIdentifier,
    signature_value: BitString,
}

impl Certificate {
    pub fn from_der(bytes: &[u8]) -> Result<Self> {
        let der: Der = bytes.decode()?;
        let asn1_obj: ASN1Object = der.decode()?;
        match asn1_obj.elements() {
            [] => Err(Error::EmptyAsn1Object),
            [element] => element.decode(),
            _ => Err(Error::TrailingData),
        }
    }

    pub fn from_pem(text: &str) -> Result<Self> {
        let pem = Pem::from_str(text)?;
        pem.decode()
    }

    pub fn tbs_certificate(&self) -> &TBSCertificate {
        &self.tbs_certificate
    }

    pub fn signature_algorithm(&self) -> &AlgorithmIdentifier {
        &self.signature_algorithm
    }

    pub fn signature_value(&self) -> &BitString {
        &self.signature_value
    }

    pub fn public_key_handle(&self) -> std::result::Result<PublicKeyHandle, ExtractError> {
        let spki = self.tbs_certificate.subject_public_key_info.clone();
        Ok(PublicKeyHandle::from_spki(spki)?)
    }
}

impl DecodableFrom<Element> for Certificate {}

impl Decoder<Element, Certificate> for Element {
    type Error = Error;

    fn decode(&self) -> Result<Certificate> {
        let Element::Sequence(elements) = self else {
            return Err(Error::InvalidCertificate(
                "expected Sequence".to_string(),
            ));
        };
        let [tbs_certificate, signature_algorithm, signature_value] = elements.as_slice() else {
            return Err(Error::InvalidCertificate(format!(
                "expected 3 elements in sequence, got {}",
                elements.len()
            )));
        };

        let tbs_certificate: TBSCertificate = tbs_certificate.decode()?;
        let signature_algorithm: AlgorithmIdentifier = signature_algorithm.decode()?;
        let Element::BitString(signature_value) = signature_value else {
            return Err(Error::InvalidCertificate(
                "expected BitString for signatureValue".to_string(),
            ));
        };

        Ok(Certificate {
            tbs_certificate,
            signature_algorithm,
            signature_value: signature_value.clone(),
        })
    }
}

impl DecodableFrom<Pem> for Certificate {}

impl Decoder<Pem, Certificate> for Pem {
    type Error = Error;

    fn decode(&self) -> Result<Certificate> {
        if self.label() != Label::Certificate {
            return Err(Error::UnexpectedPemLabel(self.label()));
        }
        let bytes: Vec<u8> = self.decode()?;
        Certificate::from_der(&bytes)
    }
}

/*
TBSCertificate  ::=  SEQUENCE  {
     version         [0]  EXPLICIT Version DEFAULT v1,
     serialNumber         CertificateSerialNumber,
     signature            AlgorithmIdentifier,
     issuer               Name,
     validity             Validity,
     subject              Name,
     subjectPublicKeyInfo SubjectPublicKeyInfo,
     issuerUniqueID  [1]  IMPLICIT UniqueIdentifier OPTIONAL,
     subjectUniqueID [2]  IMPLICIT UniqueIdentifier OPTIONAL,
     extensions      [3]  EXPLICIT Extensions OPTIONAL
}
 */

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TBSCertificate {
    version: Version,
    serial_number: Integer,
    signature: AlgorithmIdentifier,
    issuer: Name,
    validity: Validity,
    subject: Name,
    subject_public_key_info: SubjectPublicKeyInfo,
}

impl TBSCertificate {
    pub fn version(&self) -> Version {
        self.version
    }

    pub fn serial_number(&self) -> &Integer {
        &self.serial_number
    }

    pub fn signature(&self) -> &AlgorithmIdentifier {
        &self.signature
    }

    pub fn issuer(&self) -> &Name {
        &self.issuer
    }

    pub fn validity(&self) -> &Validity {
        &self.validity
    }

    pub fn subject(&self) -> &Name {
        &self.subject
    }

    pub fn subject_public_key_info(&self) -> &SubjectPublicKeyInfo {
        &self.subject_public_key_info
    }
}

impl DecodableFrom<Element> for TBSCertificate {}

impl Decoder<Element, TBSCertificate> for Element {
    type Error = Error;

    fn decode(&self) -> Result<TBSCertificate> {
        let Element::Sequence(elements) = self else {
            return Err(Error::InvalidTBSCertificate(
                "expected Sequence".to_string(),
            ));
        };

        let (version, rest) = match elements.split_first() {
            Some((
                Element::ContextSpecific {
                    slot: 0,
                    constructed: true,
                    element,
                },
                rest,
            )) => {
                let version: Version = element.as_ref().decode()?;
                (version, rest)
            }
            _ => (Version::V1, elements.as_slice()),
        };

        let [
            serial_number,
            signature,
            issuer,
            validity,
            subject,
            subject_public_key_info,
            optional @ ..,
        ] = rest
        else {
            return Err(Error::InvalidTBSCertificate(format!(
                "expected at least 6 fields after version, got {}",
                rest.len()
            )));
        };

        // issuerUniqueID, subjectUniqueID and extensions are skipped
        for field in optional {
            match field {
                Element::ContextSpecific { slot: 1..=3, .. } => {}
                other => {
                    return Err(Error::InvalidTBSCertificate(format!(
                        "unexpected field {other:?}"
                    )));
                }
            }
        }

        let Element::Integer(serial_number) = serial_number else {
            return Err(Error::InvalidCertificateSerialNumber(
                "expected Integer for CertificateSerialNumber".to_string(),
            ));
        };

        Ok(TBSCertificate {
            version,
            serial_number: serial_number.clone(),
            signature: signature.decode()?,
            issuer: issuer.decode()?,
            validity: validity.decode()?,
            subject: subject.decode()?,
            subject_public_key_info: subject_public_key_info.decode()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Version {
    V1 = 0,
    V2 = 1,
    V3 = 2,
}

impl Version {
    /// The version as people write it (`3` for the encoded value 2).
    pub fn number(&self) -> u8 {
        *self as u8 + 1
    }
}

impl DecodableFrom<Element> for Version {}

impl Decoder<Element, Version> for Element {
    type Error = Error;

    fn decode(&self) -> Result<Version> {
        let Element::Integer(i) = self else {
            return Err(Error::InvalidVersion(
                "expected Integer for Version".to_string(),
            ));
        };
        match i.to_u64() {
            Some(0) => Ok(Version::V1),
            Some(1) => Ok(Version::V2),
            Some(2) => Ok(Version::V3),
            _ => Err(Error::InvalidVersion(format!("unknown version value: {i}"))),
        }
    }
}

// https://datatracker.ietf.org/doc/html/rfc5280#section-4.1.2.5
/*
Validity ::= SEQUENCE {
    notBefore      Time,
    notAfter       Time
}
*/

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validity {
    not_before: NaiveDateTime,
    not_after: NaiveDateTime,
}

impl Validity {
    pub fn not_before(&self) -> NaiveDateTime {
        self.not_before
    }

    pub fn not_after(&self) -> NaiveDateTime {
        self.not_after
    }
}

impl DecodableFrom<Element> for Validity {}

impl Decoder<Element, Validity> for Element {
    type Error = Error;

    fn decode(&self) -> Result<Validity> {
        let Element::Sequence(elements) = self else {
            return Err(Error::InvalidValidity(
                "expected sequence for Validity".to_string(),
            ));
        };
        let time = |element: &Element, field: &str| match element {
            Element::UTCTime(dt) | Element::GeneralizedTime(dt) => Ok(*dt),
            _ => Err(Error::InvalidValidity(format!("invalid {field} time"))),
        };
        match elements.as_slice() {
            [not_before, not_after] => Ok(Validity {
                not_before: time(not_before, "notBefore")?,
                not_after: time(not_after, "notAfter")?,
            }),
            _ => Err(Error::InvalidValidity(
                "expected 2 elements in sequence".to_string(),
            )),
        }
    }
}
