//! AlgorithmIdentifier type
//!
//! Defined in [RFC 5280 Section 4.1.1.2](https://datatracker.ietf.org/doc/html/rfc5280#section-4.1.1.2)

use asn1::{Element, ObjectIdentifier};
use keywrap::decoder::{DecodableFrom, Decoder};
use keywrap::encoder::{EncodableTo, Encoder};

use crate::OidName;
use crate::error::{Error, Result};

pub mod parameters;

use parameters::{AlgorithmParameter, RawAlgorithmParameter};

/// Parameters field in AlgorithmIdentifier
///
/// Wrapped in Option:
/// - None: Field not present (e.g. Ed25519)
/// - Some(AlgorithmParameters::Null): Explicit NULL value (RSA)
/// - Some(AlgorithmParameters::Other(..)): Any other ASN.1 element, e.g. the EC named curve
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlgorithmParameters {
    /// Explicit NULL (05 00)
    Null,
    Other(RawAlgorithmParameter),
}

/// Algorithm Identifier
///
/// ```asn1
/// AlgorithmIdentifier ::= SEQUENCE {
///     algorithm   OBJECT IDENTIFIER,
///     parameters  ANY DEFINED BY algorithm OPTIONAL
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmIdentifier {
    pub algorithm: ObjectIdentifier,
    pub parameters: Option<AlgorithmParameters>,
}

impl AlgorithmIdentifier {
    // RFC 3279 / RFC 5480 key algorithms
    pub const OID_EC_PUBLIC_KEY: &'static str = "1.2.840.10045.2.1";
    pub const OID_RSA_ENCRYPTION: &'static str = "1.2.840.113549.1.1.1";
    pub const OID_ED25519: &'static str = "1.3.101.112";

    // Signature algorithms seen in certificates
    pub const OID_SHA1_WITH_RSA_ENCRYPTION: &'static str = "1.2.840.113549.1.1.5";
    pub const OID_SHA256_WITH_RSA_ENCRYPTION: &'static str = "1.2.840.113549.1.1.11";
    pub const OID_SHA384_WITH_RSA_ENCRYPTION: &'static str = "1.2.840.113549.1.1.12";
    pub const OID_SHA512_WITH_RSA_ENCRYPTION: &'static str = "1.2.840.113549.1.1.13";
    pub const OID_ECDSA_WITH_SHA256: &'static str = "1.2.840.10045.4.3.2";
    pub const OID_ECDSA_WITH_SHA384: &'static str = "1.2.840.10045.4.3.3";
    pub const OID_ECDSA_WITH_SHA512: &'static str = "1.2.840.10045.4.3.4";

    pub fn new(algorithm: ObjectIdentifier) -> Self {
        Self {
            algorithm,
            parameters: None,
        }
    }

    pub fn new_with_params(algorithm: ObjectIdentifier, parameters: AlgorithmParameters) -> Self {
        Self {
            algorithm,
            parameters: Some(parameters),
        }
    }

    pub fn algorithm(&self) -> &ObjectIdentifier {
        &self.algorithm
    }

    pub fn parameters(&self) -> Option<&AlgorithmParameters> {
        self.parameters.as_ref()
    }

    /// Reads the parameters as `P`. Absent parameters yield `Ok(None)`.
    pub fn parameter<P: AlgorithmParameter>(&self) -> Result<Option<P>> {
        match &self.parameters {
            None => Ok(None),
            Some(AlgorithmParameters::Null) => Err(Error::NullParameterNotSupported),
            Some(AlgorithmParameters::Other(raw)) => Ok(Some(P::parse(raw)?)),
        }
    }
}

impl OidName for AlgorithmIdentifier {
    fn oid_name(&self) -> Option<&'static str> {
        match self.algorithm.to_string().as_str() {
            Self::OID_EC_PUBLIC_KEY => Some("id-ecPublicKey"),
            Self::OID_RSA_ENCRYPTION => Some("rsaEncryption"),
            Self::OID_ED25519 => Some("Ed25519"),
            Self::OID_SHA1_WITH_RSA_ENCRYPTION => Some("sha1WithRSAEncryption"),
            Self::OID_SHA256_WITH_RSA_ENCRYPTION => Some("sha256WithRSAEncryption"),
            Self::OID_SHA384_WITH_RSA_ENCRYPTION => Some("sha384WithRSAEncryption"),
            Self::OID_SHA512_WITH_RSA_ENCRYPTION => Some("sha512WithRSAEncryption"),
            Self::OID_ECDSA_WITH_SHA256 => Some("ecdsa-with-SHA256"),
            Self::OID_ECDSA_WITH_SHA384 => Some("ecdsa-with-SHA384"),
            Self::OID_ECDSA_WITH_SHA512 => Some("ecdsa-with-SHA512"),
            _ => None,
        }
    }
}

impl DecodableFrom<Element> for AlgorithmIdentifier {}

impl Decoder<Element, AlgorithmIdentifier> for Element {
    type Error = Error;

    fn decode(&self) -> Result<AlgorithmIdentifier> {
        let Element::Sequence(elements) = self else {
            return Err(Error::AlgorithmIdentifierExpectedSequence);
        };
        if elements.len() > 2 {
            return Err(Error::AlgorithmIdentifierInvalidElementCount(
                elements.len(),
            ));
        }

        let algorithm = match elements.first() {
            Some(Element::ObjectIdentifier(oid)) => oid.clone(),
            Some(_) => return Err(Error::AlgorithmIdentifierExpectedOid),
            None => return Err(Error::AlgorithmIdentifierEmpty),
        };

        let parameters = match elements.get(1) {
            Some(Element::Null) => Some(AlgorithmParameters::Null),
            Some(other) => Some(AlgorithmParameters::Other(RawAlgorithmParameter::new(
                other.clone(),
            ))),
            None => None,
        };

        Ok(AlgorithmIdentifier {
            algorithm,
            parameters,
        })
    }
}

impl EncodableTo<AlgorithmIdentifier> for Element {}

impl Encoder<AlgorithmIdentifier, Element> for AlgorithmIdentifier {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        let mut elements = vec![Element::ObjectIdentifier(self.algorithm.clone())];
        match &self.parameters {
            Some(AlgorithmParameters::Null) => elements.push(Element::Null),
            Some(AlgorithmParameters::Other(raw)) => elements.push(raw.element().clone()),
            None => {}
        }
        Ok(Element::Sequence(elements))
    }
}
