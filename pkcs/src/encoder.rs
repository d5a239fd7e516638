//! Raw public key bytes to `SubjectPublicKeyInfo` DER and PEM.
//!
//! Secure key stores hand out public keys without the X.509 wrapper:
//! an uncompressed point (`0x04 || X || Y`) for EC keys, the modulus and
//! exponent blob for RSA keys. [`encode_public_key_as_der`] adds the
//! AlgorithmIdentifier selected from [`KEY_SPECS`] and the BIT STRING:
//!
//! ```asn1
//! SubjectPublicKeyInfo ::= SEQUENCE {
//!     algorithm         AlgorithmIdentifier,
//!     subjectPublicKey  BIT STRING  -- 0x00 || raw
//! }
//! ```

use std::fmt::Display;
use std::str::FromStr;

use asn1::{ASN1Object, BitString, Element, ObjectIdentifier};
use der::Der;
use keywrap::encoder::Encoder;
use pem::{Label, Pem};
use pkix_types::{
    AlgorithmIdentifier, AlgorithmParameters, NamedCurve, RawAlgorithmParameter,
    SubjectPublicKeyInfo,
};

use crate::error::{EncodeError, Error};

const UNCOMPRESSED_POINT: u8 = 0x04;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    Ec,
    Rsa,
}

impl KeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Ec => "EC",
            KeyType::Rsa => "RSA",
        }
    }
}

impl Display for KeyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ec" => Ok(KeyType::Ec),
            "rsa" => Ok(KeyType::Rsa),
            _ => Err(Error::InvalidKeyType(s.to_string())),
        }
    }
}

/// How the `parameters` field of the AlgorithmIdentifier is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyParameters {
    Null,
    NamedCurve(NamedCurve),
}

/// One supported `(key type, key size)` combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpec {
    pub key_type: KeyType,
    pub key_size_bits: u32,
    /// Dotted algorithm OID.
    pub algorithm: &'static str,
    pub parameters: KeyParameters,
    /// Exact raw length when the format fixes it.
    pub raw_len: Option<usize>,
    /// Required first octet of the raw bytes.
    pub leading_octet: Option<u8>,
}

const fn ec(curve: NamedCurve, key_size_bits: u32, raw_len: usize) -> KeySpec {
    KeySpec {
        key_type: KeyType::Ec,
        key_size_bits,
        algorithm: AlgorithmIdentifier::OID_EC_PUBLIC_KEY,
        parameters: KeyParameters::NamedCurve(curve),
        raw_len: Some(raw_len),
        leading_octet: Some(UNCOMPRESSED_POINT),
    }
}

const fn rsa(key_size_bits: u32) -> KeySpec {
    KeySpec {
        key_type: KeyType::Rsa,
        key_size_bits,
        algorithm: AlgorithmIdentifier::OID_RSA_ENCRYPTION,
        parameters: KeyParameters::Null,
        raw_len: None,
        leading_octet: None,
    }
}

/// Every key the encoder accepts. New algorithms are added here.
pub const KEY_SPECS: &[KeySpec] = &[
    ec(NamedCurve::Secp256r1, 256, 65),
    ec(NamedCurve::Secp384r1, 384, 97),
    ec(NamedCurve::Secp521r1, 521, 133),
    rsa(1024),
    rsa(2048),
    rsa(3072),
    rsa(4096),
];

impl KeySpec {
    pub fn lookup(key_type: KeyType, key_size_bits: u32) -> Option<&'static KeySpec> {
        KEY_SPECS
            .iter()
            .find(|spec| spec.key_type == key_type && spec.key_size_bits == key_size_bits)
    }

    pub fn algorithm_identifier(&self) -> Result<AlgorithmIdentifier, EncodeError> {
        let algorithm = ObjectIdentifier::from_str(self.algorithm)?;
        let parameters = match self.parameters {
            KeyParameters::Null => AlgorithmParameters::Null,
            KeyParameters::NamedCurve(curve) => AlgorithmParameters::Other(
                RawAlgorithmParameter::new(Element::ObjectIdentifier(curve.oid()?)),
            ),
        };
        Ok(AlgorithmIdentifier::new_with_params(algorithm, parameters))
    }

    /// Checks the raw bytes against the length and leading octet of this row.
    pub fn check_raw(&self, raw: &[u8]) -> Result<(), EncodeError> {
        let Some(&first) = raw.first() else {
            return Err(EncodeError::EmptyInput);
        };
        if let Some(expected) = self.raw_len {
            if raw.len() != expected {
                return Err(EncodeError::InvalidKeyLength {
                    expected,
                    actual: raw.len(),
                });
            }
        }
        match self.leading_octet {
            Some(marker) if marker != first => Err(EncodeError::InvalidPointFormat(first)),
            _ => Ok(()),
        }
    }
}

/// Wraps raw public key bytes in a DER `SubjectPublicKeyInfo`.
///
/// # Errors
///
/// - [`EncodeError::EmptyInput`] if `raw` is empty
/// - [`EncodeError::UnsupportedAlgorithm`] if no row of [`KEY_SPECS`] matches
/// - [`EncodeError::InvalidKeyLength`] / [`EncodeError::InvalidPointFormat`]
///   if `raw` does not have the shape the row requires
pub fn encode_public_key_as_der(
    raw: &[u8],
    key_type: KeyType,
    key_size_bits: u32,
) -> Result<Vec<u8>, EncodeError> {
    if raw.is_empty() {
        return Err(EncodeError::EmptyInput);
    }
    let spec = KeySpec::lookup(key_type, key_size_bits).ok_or(
        EncodeError::UnsupportedAlgorithm {
            key_type,
            key_size_bits,
        },
    )?;
    spec.check_raw(raw)?;

    let spki = SubjectPublicKeyInfo::new(
        spec.algorithm_identifier()?,
        BitString::new(0, raw.to_vec()),
    );
    let element: Element = spki.encode()?;
    let der: Der = ASN1Object::new(vec![element]).encode()?;
    Ok(der.encode()?)
}

/// Wraps DER bytes in a `PUBLIC KEY` PEM block. Use `to_string()` for the text.
pub fn der_to_pem(der: &[u8]) -> Pem {
    Pem::from_bytes(Label::PublicKey, der)
}

#[cfg(test)]
mod tests {
    use keywrap::decoder::Decoder;
    use rstest::rstest;

    use super::*;

    const RSA2048_RAW: &[u8] = include_bytes!("../../testdata/rsa2048_raw.bin");
    const RSA2048_SPKI: &[u8] = include_bytes!("../../testdata/rsa2048_pub.der");
    const RSA2048_PEM: &str = include_str!("../../testdata/rsa2048_pub.pem");
    const EC256_SPKI: &[u8] = include_bytes!("../../testdata/ec256_pub.der");
    const EC256_PEM: &str = include_str!("../../testdata/ec256_pub.pem");

    fn parse_spki(bytes: &[u8]) -> SubjectPublicKeyInfo {
        let der: Der = bytes.decode().unwrap();
        let object: ASN1Object = der.decode().unwrap();
        assert_eq!(1, object.elements().len());
        object.elements()[0].decode().unwrap()
    }

    fn raw_for(spec: &KeySpec) -> Vec<u8> {
        match spec.raw_len {
            Some(len) => {
                let mut raw = vec![0x5a; len];
                raw[0] = UNCOMPRESSED_POINT;
                raw
            }
            None => RSA2048_RAW.to_vec(),
        }
    }

    #[rstest(input, expected,
        case("ec", KeyType::Ec),
        case("EC", KeyType::Ec),
        case("rsa", KeyType::Rsa),
        case("Rsa", KeyType::Rsa),
    )]
    fn test_key_type_from_str(input: &str, expected: KeyType) {
        assert_eq!(expected, KeyType::from_str(input).unwrap());
    }

    #[test]
    fn test_key_type_rejects_unknown() {
        assert!(matches!(
            KeyType::from_str("dsa"),
            Err(Error::InvalidKeyType(s)) if s == "dsa"
        ));
        assert_eq!("EC", KeyType::Ec.to_string());
        assert_eq!("RSA", KeyType::Rsa.to_string());
    }

    #[test]
    fn test_encode_matches_openssl_rsa2048() {
        let der = encode_public_key_as_der(RSA2048_RAW, KeyType::Rsa, 2048).unwrap();
        assert_eq!(RSA2048_SPKI, der.as_slice());
        assert_eq!(RSA2048_PEM, der_to_pem(&der).to_string());
    }

    #[test]
    fn test_encode_matches_openssl_ec256() {
        let point = &EC256_SPKI[EC256_SPKI.len() - 65..];
        let der = encode_public_key_as_der(point, KeyType::Ec, 256).unwrap();
        assert_eq!(EC256_SPKI, der.as_slice());
        assert_eq!(EC256_PEM, der_to_pem(&der).to_string());
    }

    #[test]
    fn test_encode_all_zero_ec256_point() {
        let mut raw = vec![0u8; 65];
        raw[0] = UNCOMPRESSED_POINT;

        let der = encode_public_key_as_der(&raw, KeyType::Ec, 256).unwrap();
        let spki = parse_spki(&der);

        assert_eq!(spki.algorithm().algorithm(), &"1.2.840.10045.2.1");
        let curve: Option<NamedCurve> = spki.algorithm().parameter().unwrap();
        assert_eq!(Some(NamedCurve::Secp256r1), curve);
        assert_eq!(0, spki.subject_public_key().unused_bits());
        assert_eq!(raw.as_slice(), spki.subject_public_key().as_bytes());

        // BIT STRING: tag, length 66, unused-bits octet, then the point
        let bit_string = &der[der.len() - 68..];
        assert_eq!(&[0x03, 0x42, 0x00], &bit_string[..3]);
        assert_eq!(raw.as_slice(), &bit_string[3..]);
    }

    #[test]
    fn test_encode_rsa_270_byte_blob_uses_long_form_lengths() {
        let raw = vec![0xab; 270];
        let der = encode_public_key_as_der(&raw, KeyType::Rsa, 2048).unwrap();

        // outer SEQUENCE of 290 bytes, BIT STRING of 271 bytes
        assert_eq!(&[0x30, 0x82, 0x01, 0x22], &der[..4]);
        assert_eq!(&[0x03, 0x82, 0x01, 0x0f, 0x00], &der[19..24]);
        assert_eq!(294, der.len());

        let spki = parse_spki(&der);
        assert_eq!(spki.algorithm().algorithm(), &"1.2.840.113549.1.1.1");
        assert_eq!(
            Some(&AlgorithmParameters::Null),
            spki.algorithm().parameters()
        );
        assert_eq!(raw.as_slice(), spki.subject_public_key().as_bytes());
    }

    #[test]
    fn test_every_table_row_round_trips() {
        for spec in KEY_SPECS {
            let raw = raw_for(spec);
            let der = encode_public_key_as_der(&raw, spec.key_type, spec.key_size_bits).unwrap();
            let spki = parse_spki(&der);
            assert_eq!(&spec.algorithm_identifier().unwrap(), spki.algorithm());
            assert_eq!(raw.as_slice(), spki.subject_public_key().as_bytes());
        }
    }

    #[rstest(raw, key_type, key_size_bits,
        case(vec![], KeyType::Ec, 256),
        case(vec![], KeyType::Rsa, 2048),
        case(vec![], KeyType::Rsa, 512),
    )]
    fn test_encode_empty_input(raw: Vec<u8>, key_type: KeyType, key_size_bits: u32) {
        assert!(matches!(
            encode_public_key_as_der(&raw, key_type, key_size_bits),
            Err(EncodeError::EmptyInput)
        ));
    }

    #[rstest(key_type, key_size_bits,
        case(KeyType::Ec, 224),
        case(KeyType::Ec, 2048),
        case(KeyType::Rsa, 256),
        case(KeyType::Rsa, 1536),
    )]
    fn test_encode_unsupported_algorithm(key_type: KeyType, key_size_bits: u32) {
        let raw = vec![UNCOMPRESSED_POINT; 65];
        match encode_public_key_as_der(&raw, key_type, key_size_bits) {
            Err(EncodeError::UnsupportedAlgorithm {
                key_type: t,
                key_size_bits: b,
            }) => {
                assert_eq!(key_type, t);
                assert_eq!(key_size_bits, b);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[rstest(len, key_size_bits, expected,
        case(64, 256, 65),
        case(66, 256, 65),
        case(65, 384, 97),
        case(132, 521, 133),
    )]
    fn test_encode_invalid_ec_length(len: usize, key_size_bits: u32, expected: usize) {
        let mut raw = vec![0u8; len];
        raw[0] = UNCOMPRESSED_POINT;
        match encode_public_key_as_der(&raw, KeyType::Ec, key_size_bits) {
            Err(EncodeError::InvalidKeyLength {
                expected: e,
                actual,
            }) => {
                assert_eq!(expected, e);
                assert_eq!(len, actual);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[rstest(marker, case(0x00), case(0x02), case(0x03))]
    fn test_encode_rejects_compressed_or_bad_point(marker: u8) {
        let mut raw = vec![0x11; 65];
        raw[0] = marker;
        assert!(matches!(
            encode_public_key_as_der(&raw, KeyType::Ec, 256),
            Err(EncodeError::InvalidPointFormat(m)) if m == marker
        ));
    }

    #[test]
    fn test_der_to_pem_layout() {
        let der = encode_public_key_as_der(RSA2048_RAW, KeyType::Rsa, 2048).unwrap();
        let text = der_to_pem(&der).to_string();

        assert!(text.starts_with("-----BEGIN PUBLIC KEY-----\n"));
        assert!(text.ends_with("-----END PUBLIC KEY-----\n"));
        let lines: Vec<&str> = text.lines().collect();
        let body = &lines[1..lines.len() - 1];
        assert!(body.iter().all(|line| line.len() <= pem::LINE_WIDTH));
        assert!(body[..body.len() - 1].iter().all(|line| line.len() == pem::LINE_WIDTH));
    }

    #[test]
    fn test_der_to_pem_is_deterministic_and_distinct() {
        let first = der_to_pem(EC256_SPKI).to_string();
        let second = der_to_pem(EC256_SPKI).to_string();
        assert_eq!(first, second);

        let mut other = EC256_SPKI.to_vec();
        let last = other.len() - 1;
        other[last] ^= 0x01;
        assert_ne!(first, der_to_pem(&other).to_string());
    }

    #[rstest(der, case(EC256_SPKI), case(RSA2048_SPKI), case(&[]), case(&[0x05, 0x00]))]
    fn test_pem_decodes_back_to_der(der: &[u8]) {
        let text = der_to_pem(der).to_string();
        let pem = Pem::from_str(&text).unwrap();
        assert_eq!(Label::PublicKey, pem.label());
        let decoded: Vec<u8> = pem.decode().unwrap();
        assert_eq!(der, decoded.as_slice());
    }
}
