use asn1::{ASN1Object, Element, Integer};
use der::Der;
use keywrap::decoder::{DecodableFrom, Decoder};
use keywrap::encoder::{EncodableTo, Encoder};

use super::error::{Error, Result};

/*
RFC 8017 - RSA Public Key

RSAPublicKey ::= SEQUENCE {
    modulus           INTEGER,  -- n
    publicExponent    INTEGER   -- e
}
*/

/// PKCS#1 RSA Public Key structure
///
/// This is what the BIT STRING of an `rsaEncryption` SubjectPublicKeyInfo
/// holds, and what key stores return as the raw RSA public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RSAPublicKey {
    pub modulus: Integer,         // n
    pub public_exponent: Integer, // e
}

impl RSAPublicKey {
    /// Parses a DER `RSAPublicKey`; trailing bytes are rejected.
    pub fn from_der(bytes: &[u8]) -> Result<Self> {
        let der: Der = bytes.decode()?;
        let asn1_obj: ASN1Object = der.decode()?;
        let [element] = asn1_obj.elements() else {
            return Err(Error::UnexpectedStructureCount);
        };
        element.decode()
    }

    pub fn to_der(&self) -> Result<Vec<u8>> {
        let element = self.encode()?;
        Ok(element.to_der_bytes()?)
    }

    /// Key size in bits (RSA modulus bit length)
    pub fn key_size(&self) -> u32 {
        self.modulus.bits() as u32
    }
}

impl DecodableFrom<Element> for RSAPublicKey {}

impl Decoder<Element, RSAPublicKey> for Element {
    type Error = Error;

    fn decode(&self) -> Result<RSAPublicKey> {
        let Element::Sequence(elements) = self else {
            return Err(Error::ExpectedSequence);
        };
        let [modulus, public_exponent] = elements.as_slice() else {
            return Err(Error::InvalidElementCount(elements.len()));
        };

        let get_integer = |element: &Element, field: &'static str| -> Result<Integer> {
            match element {
                Element::Integer(int) if int.is_positive() => Ok(int.clone()),
                Element::Integer(_) => Err(Error::NotPositive { field }),
                _ => Err(Error::ExpectedInteger { field }),
            }
        };

        Ok(RSAPublicKey {
            modulus: get_integer(modulus, "modulus")?,
            public_exponent: get_integer(public_exponent, "publicExponent")?,
        })
    }
}

impl EncodableTo<RSAPublicKey> for Element {}

impl Encoder<RSAPublicKey, Element> for RSAPublicKey {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        Ok(Element::Sequence(vec![
            Element::Integer(self.modulus.clone()),
            Element::Integer(self.public_exponent.clone()),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const RSA2048_RAW: &[u8] = include_bytes!("../../../testdata/rsa2048_raw.bin");

    #[test]
    fn test_rsa_public_key_encode_decode() {
        let pubkey = RSAPublicKey {
            modulus: Integer::from(&[0x00, 0xff, 0xaa][..]),
            public_exponent: Integer::from(65537u64),
        };

        let encoded: Element = pubkey.encode().unwrap();
        let decoded: RSAPublicKey = encoded.decode().unwrap();

        assert_eq!(decoded, pubkey);
    }

    #[test]
    fn test_real_rsa2048_public_key() {
        let key = RSAPublicKey::from_der(RSA2048_RAW).unwrap();
        assert_eq!(2048, key.key_size());
        assert_eq!(Some(65537), key.public_exponent.to_u64());

        let modulus = key.modulus.to_unsigned_bytes_be();
        assert_eq!(256, modulus.len());
        assert_eq!(&[0xb9, 0x0e, 0x83, 0x45], &modulus[..4]);
        assert_eq!(&[0xd1, 0x1c, 0x51], &modulus[253..]);

        assert_eq!(RSA2048_RAW, key.to_der().unwrap().as_slice());
    }

    #[rstest(input,
        // INTEGER instead of SEQUENCE
        case(vec![0x02, 0x01, 0x01]),
        // SEQUENCE with a single INTEGER
        case(vec![0x30, 0x03, 0x02, 0x01, 0x01]),
        // publicExponent is a NULL
        case(vec![0x30, 0x05, 0x02, 0x01, 0x01, 0x05, 0x00]),
        // negative modulus
        case(vec![0x30, 0x06, 0x02, 0x01, 0x81, 0x02, 0x01, 0x03]),
        // two structures back to back
        case(vec![0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x03, 0x05, 0x00]),
        // truncated
        case(vec![0x30, 0x82, 0x01, 0x0a, 0x02]),
        case(vec![]),
    )]
    fn test_rsa_public_key_rejects(input: Vec<u8>) {
        assert!(RSAPublicKey::from_der(&input).is_err());
    }
}
