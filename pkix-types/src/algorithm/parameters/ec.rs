//! Elliptic curve domain parameters
//!
//! [RFC 5480 Section 2.1.1](https://datatracker.ietf.org/doc/html/rfc5480#section-2.1.1)
//!
//! ```asn1
//! ECParameters ::= CHOICE {
//!     namedCurve         OBJECT IDENTIFIER
//!     -- implicitCurve   NULL
//!     -- specifiedCurve  SpecifiedECDomain
//! }
//! ```
//!
//! Only `namedCurve` is accepted, as required by RFC 5480.

use std::fmt::Display;
use std::str::FromStr;

use asn1::{Element, ObjectIdentifier};

use super::{AlgorithmParameter, RawAlgorithmParameter};
use crate::OidName;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedCurve {
    /// NIST P-256, also known as prime256v1
    Secp256r1,
    /// NIST P-384
    Secp384r1,
    /// NIST P-521
    Secp521r1,
}

impl NamedCurve {
    pub const OID_SECP256R1: &'static str = "1.2.840.10045.3.1.7";
    pub const OID_SECP384R1: &'static str = "1.3.132.0.34";
    pub const OID_SECP521R1: &'static str = "1.3.132.0.35";

    pub fn oid_str(&self) -> &'static str {
        match self {
            NamedCurve::Secp256r1 => Self::OID_SECP256R1,
            NamedCurve::Secp384r1 => Self::OID_SECP384R1,
            NamedCurve::Secp521r1 => Self::OID_SECP521R1,
        }
    }

    pub fn oid(&self) -> Result<ObjectIdentifier> {
        Ok(ObjectIdentifier::from_str(self.oid_str())?)
    }

    /// Field size in bits, which is also the key size reported for the curve.
    pub fn field_size_bits(&self) -> u32 {
        match self {
            NamedCurve::Secp256r1 => 256,
            NamedCurve::Secp384r1 => 384,
            NamedCurve::Secp521r1 => 521,
        }
    }

    /// Length of one affine coordinate in octets.
    pub fn coordinate_len(&self) -> usize {
        (self.field_size_bits() as usize).div_ceil(8)
    }

    /// Length of an uncompressed point: `0x04 || X || Y`.
    pub fn point_len(&self) -> usize {
        1 + 2 * self.coordinate_len()
    }
}

impl Display for NamedCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.oid_name().unwrap_or_else(|| self.oid_str()))
    }
}

impl OidName for NamedCurve {
    fn oid_name(&self) -> Option<&'static str> {
        Some(match self {
            NamedCurve::Secp256r1 => "secp256r1",
            NamedCurve::Secp384r1 => "secp384r1",
            NamedCurve::Secp521r1 => "secp521r1",
        })
    }
}

impl TryFrom<&ObjectIdentifier> for NamedCurve {
    type Error = Error;

    fn try_from(oid: &ObjectIdentifier) -> Result<Self> {
        match oid.to_string().as_str() {
            Self::OID_SECP256R1 => Ok(NamedCurve::Secp256r1),
            Self::OID_SECP384R1 => Ok(NamedCurve::Secp384r1),
            Self::OID_SECP521R1 => Ok(NamedCurve::Secp521r1),
            other => Err(Error::UnknownNamedCurve(other.to_string())),
        }
    }
}

impl AlgorithmParameter for NamedCurve {
    fn parse(raw: &RawAlgorithmParameter) -> Result<Self> {
        match raw.element() {
            Element::ObjectIdentifier(oid) => NamedCurve::try_from(oid),
            _ => Err(Error::EcParametersExpectedNamedCurve),
        }
    }
}
