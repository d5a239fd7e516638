//! Validated public keys.
//!
//! A [`PublicKeyHandle`] is a `SubjectPublicKeyInfo` whose algorithm has a
//! row in [`KEY_SPECS`](crate::KEY_SPECS) and whose key bits have the shape
//! that row requires. It can be built from an SPKI (e.g. one taken out of a
//! certificate), from SPKI DER bytes, or from a `PUBLIC KEY` PEM block, and
//! re-exported through the same encoder that wraps raw keys, so a key read
//! back from a certificate serializes byte-for-byte like the same key
//! exported from a key store.
//!
//! ```ignore
//! use keywrap::decoder::Decoder;
//! use pem::Pem;
//! use pkcs::{KeyDetails, PublicKeyHandle};
//!
//! let pem: Pem = text.parse()?;
//! let key: PublicKeyHandle = pem.decode()?;
//! if let KeyDetails::Rsa { public_exponent, .. } = key.details() {
//!     println!("e = {public_exponent}");
//! }
//! ```

use asn1::{ASN1Object, Integer};
use der::Der;
use keywrap::decoder::{DecodableFrom, Decoder};
use pem::{Label, Pem, ToPem};
use pkix_types::{AlgorithmIdentifier, NamedCurve, SubjectPublicKeyInfo};

use crate::encoder::{KeySpec, KeyType, encode_public_key_as_der};
use crate::error::{Error, Result};
use crate::pkcs1::RSAPublicKey;

/// Algorithm-specific fields of a public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyDetails {
    Rsa {
        modulus: Integer,
        public_exponent: Integer,
    },
    Ec {
        curve: NamedCurve,
        x: Vec<u8>,
        y: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyHandle {
    spec: &'static KeySpec,
    spki: SubjectPublicKeyInfo,
    details: KeyDetails,
}

impl PublicKeyHandle {
    /// # Errors
    ///
    /// [`Error::UnsupportedKeyAlgorithm`] when the algorithm, curve or RSA
    /// modulus size has no entry in the key table. Structural problems in
    /// the key bits are reported as [`Error::UnalignedKeyBits`],
    /// [`Error::Pkcs1`] or [`Error::Encode`].
    pub fn from_spki(spki: SubjectPublicKeyInfo) -> Result<Self> {
        let unused_bits = spki.subject_public_key().unused_bits();
        if unused_bits != 0 {
            return Err(Error::UnalignedKeyBits(unused_bits));
        }
        let algorithm = spki.algorithm();
        let raw = spki.subject_public_key().as_bytes();
        let oid = algorithm.algorithm().to_string();

        let (key_type, key_size_bits, details) = match oid.as_str() {
            AlgorithmIdentifier::OID_EC_PUBLIC_KEY => {
                let curve = algorithm
                    .parameter::<NamedCurve>()
                    .ok()
                    .flatten()
                    .ok_or_else(|| Error::UnsupportedKeyAlgorithm(curve_name(algorithm)))?;
                let coordinate_len = curve.coordinate_len();
                // shape is checked against the table below
                let (x, y) = match raw.get(1..) {
                    Some(point) if point.len() == 2 * coordinate_len => {
                        let (x, y) = point.split_at(coordinate_len);
                        (x.to_vec(), y.to_vec())
                    }
                    _ => (Vec::new(), Vec::new()),
                };
                (
                    KeyType::Ec,
                    curve.field_size_bits(),
                    KeyDetails::Ec { curve, x, y },
                )
            }
            AlgorithmIdentifier::OID_RSA_ENCRYPTION => {
                let key = RSAPublicKey::from_der(raw)?;
                (
                    KeyType::Rsa,
                    key.key_size(),
                    KeyDetails::Rsa {
                        modulus: key.modulus,
                        public_exponent: key.public_exponent,
                    },
                )
            }
            _ => return Err(Error::UnsupportedKeyAlgorithm(oid)),
        };

        let spec = KeySpec::lookup(key_type, key_size_bits).ok_or_else(|| {
            Error::UnsupportedKeyAlgorithm(format!("{key_type} {key_size_bits}-bit"))
        })?;
        if &spec.algorithm_identifier()? != algorithm {
            return Err(Error::UnsupportedKeyAlgorithm(format!(
                "{oid} with unexpected parameters"
            )));
        }
        spec.check_raw(raw)?;

        Ok(Self {
            spec,
            spki,
            details,
        })
    }

    /// Parses DER `SubjectPublicKeyInfo` bytes.
    pub fn from_der(bytes: &[u8]) -> Result<Self> {
        let der: Der = bytes.decode()?;
        let asn1_obj: ASN1Object = der.decode()?;
        let spki: SubjectPublicKeyInfo = match asn1_obj.elements() {
            [] => return Err(Error::EmptyAsn1Object),
            [element] => element.decode()?,
            _ => return Err(Error::TrailingData),
        };
        Self::from_spki(spki)
    }

    pub fn key_type(&self) -> KeyType {
        self.spec.key_type
    }

    pub fn key_size_bits(&self) -> u32 {
        self.spec.key_size_bits
    }

    /// The BIT STRING payload: the point for EC keys, PKCS#1 DER for RSA keys.
    pub fn raw_bytes(&self) -> &[u8] {
        self.spki.subject_public_key().as_bytes()
    }

    pub fn spki(&self) -> &SubjectPublicKeyInfo {
        &self.spki
    }

    pub fn details(&self) -> &KeyDetails {
        &self.details
    }

    pub fn to_der(&self) -> Result<Vec<u8>> {
        Ok(encode_public_key_as_der(
            self.raw_bytes(),
            self.key_type(),
            self.key_size_bits(),
        )?)
    }
}

fn curve_name(algorithm: &AlgorithmIdentifier) -> String {
    match algorithm.parameters() {
        Some(pkix_types::AlgorithmParameters::Other(raw)) => match raw.element() {
            asn1::Element::ObjectIdentifier(oid) => format!("EC curve {oid}"),
            _ => "EC with explicit curve parameters".to_string(),
        },
        _ => "EC without named curve".to_string(),
    }
}

impl ToPem for PublicKeyHandle {
    type Error = Error;

    fn pem_label(&self) -> Label {
        Label::PublicKey
    }

    fn to_pem(&self) -> Result<Pem> {
        Ok(Pem::from_bytes(self.pem_label(), &self.to_der()?))
    }
}

impl DecodableFrom<Pem> for PublicKeyHandle {}

impl Decoder<Pem, PublicKeyHandle> for Pem {
    type Error = Error;

    fn decode(&self) -> Result<PublicKeyHandle> {
        if self.label() != Label::PublicKey {
            return Err(Error::UnexpectedPemLabel(self.label()));
        }
        let bytes: Vec<u8> = self.decode()?;
        PublicKeyHandle::from_der(&bytes)
    }
}
