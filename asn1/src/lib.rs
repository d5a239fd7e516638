use std::{fmt::Display, str::FromStr};

use chrono::{Datelike, NaiveDateTime};
use der::{Der, PrimitiveTag, Tag, Tlv};
use error::Error;
use keywrap::decoder::{DecodableFrom, Decoder};
use keywrap::encoder::{EncodableTo, Encoder};
use num_bigint::{BigInt, Sign};
use num_traits::ToPrimitive;

pub mod error;

#[derive(Debug, Clone)]
pub struct ASN1Object {
    elements: Vec<Element>,
}

impl ASN1Object {
    pub fn new(elements: Vec<Element>) -> Self {
        ASN1Object { elements }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }
}

impl DecodableFrom<Der> for ASN1Object {}

impl Decoder<Der, ASN1Object> for Der {
    type Error = Error;

    fn decode(&self) -> Result<ASN1Object, Error> {
        let elements = self
            .elements()
            .iter()
            .map(Element::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ASN1Object { elements })
    }
}

impl EncodableTo<ASN1Object> for Der {}

impl Encoder<ASN1Object, Der> for ASN1Object {
    type Error = Error;

    fn encode(&self) -> Result<Der, Self::Error> {
        let tlvs = self
            .elements
            .iter()
            .map(Element::encode)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Der::new(tlvs))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Boolean(bool),
    Integer(Integer),
    BitString(BitString),
    OctetString(OctetString),
    Null,
    ObjectIdentifier(ObjectIdentifier),
    UTF8String(String),
    Sequence(Vec<Element>),
    Set(Vec<Element>),
    PrintableString(String),
    IA5String(String),
    UTCTime(NaiveDateTime),
    GeneralizedTime(NaiveDateTime),
    ContextSpecific {
        slot: u8,
        constructed: bool,
        element: Box<Element>,
    },
    Unimplemented(Tlv),
}

impl Element {
    /// Encodes the element as a standalone DER byte string.
    pub fn to_der_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(self.encode()?.to_bytes())
    }
}

fn data_of(tlv: &Tlv) -> &[u8] {
    tlv.data().unwrap_or_default()
}

fn children_of(tlv: &Tlv) -> Result<Vec<Element>, Error> {
    tlv.tlvs()
        .unwrap_or_default()
        .iter()
        .map(Element::try_from)
        .collect()
}

impl TryFrom<&Tlv> for Element {
    type Error = Error;

    fn try_from(tlv: &Tlv) -> Result<Self, Self::Error> {
        match tlv.tag() {
            Tag::Primitive(primitive_tag, _) => match primitive_tag {
                PrimitiveTag::Boolean => match data_of(tlv) {
                    [0x00] => Ok(Element::Boolean(false)),
                    [0xff] => Ok(Element::Boolean(true)),
                    _ => Err(Error::InvalidBoolean),
                },
                PrimitiveTag::Integer => {
                    let data = data_of(tlv);
                    if data.is_empty() {
                        return Err(Error::EmptyContent("INTEGER"));
                    }
                    Ok(Element::Integer(Integer::from(data)))
                }
                PrimitiveTag::BitString => {
                    Ok(Element::BitString(BitString::try_from(data_of(tlv))?))
                }
                PrimitiveTag::OctetString => {
                    Ok(Element::OctetString(OctetString::from(data_of(tlv))))
                }
                PrimitiveTag::Null => Ok(Element::Null),
                PrimitiveTag::ObjectIdentifier => Ok(Element::ObjectIdentifier(
                    ObjectIdentifier::try_from(data_of(tlv))?,
                )),
                PrimitiveTag::UTF8String => String::from_utf8(data_of(tlv).to_vec())
                    .map(Element::UTF8String)
                    .map_err(|_| Error::InvalidString("UTF8String")),
                PrimitiveTag::Sequence => Ok(Element::Sequence(children_of(tlv)?)),
                PrimitiveTag::Set => Ok(Element::Set(children_of(tlv)?)),
                PrimitiveTag::PrintableString => String::from_utf8(data_of(tlv).to_vec())
                    .map(Element::PrintableString)
                    .map_err(|_| Error::InvalidString("PrintableString")),
                PrimitiveTag::IA5String => {
                    let data = data_of(tlv);
                    if !data.is_ascii() {
                        return Err(Error::InvalidString("IA5String"));
                    }
                    String::from_utf8(data.to_vec())
                        .map(Element::IA5String)
                        .map_err(|_| Error::InvalidString("IA5String"))
                }
                PrimitiveTag::UTCTime => Ok(Element::UTCTime(parse_utc_time(data_of(tlv))?)),
                PrimitiveTag::GeneralizedTime => Ok(Element::GeneralizedTime(
                    parse_generalized_time(data_of(tlv))?,
                )),
                PrimitiveTag::Unimplemented(_) => Ok(Element::Unimplemented(tlv.clone())),
            },
            Tag::ContextSpecific { slot, constructed } => {
                if *constructed {
                    // EXPLICIT tagging: exactly one wrapped element
                    match tlv.tlvs() {
                        Some([inner]) => Ok(Element::ContextSpecific {
                            slot: *slot,
                            constructed: true,
                            element: Box::new(Element::try_from(inner)?),
                        }),
                        _ => Err(Error::InvalidContextSpecific {
                            slot: *slot,
                            msg: "context-specific constructed must have exactly one sub-tlv"
                                .to_string(),
                        }),
                    }
                } else {
                    // IMPLICIT tagging: the schema above decides how to read the octets
                    Ok(Element::ContextSpecific {
                        slot: *slot,
                        constructed: false,
                        element: Box::new(Element::OctetString(OctetString::from(data_of(tlv)))),
                    })
                }
            }
        }
    }
}

impl EncodableTo<Element> for Tlv {}

impl Encoder<Element, Tlv> for Element {
    type Error = Error;

    fn encode(&self) -> Result<Tlv, Self::Error> {
        let tlv = match self {
            Element::Boolean(b) => Tlv::new_primitive(
                Tag::universal(PrimitiveTag::Boolean),
                vec![if *b { 0xff } else { 0x00 }],
            ),
            Element::Integer(i) => Tlv::new_primitive(
                Tag::universal(PrimitiveTag::Integer),
                i.as_bigint().to_signed_bytes_be(),
            ),
            Element::BitString(bs) => {
                Tlv::new_primitive(Tag::universal(PrimitiveTag::BitString), bs.to_der_content())
            }
            Element::OctetString(os) => Tlv::new_primitive(
                Tag::universal(PrimitiveTag::OctetString),
                os.as_bytes().to_vec(),
            ),
            Element::Null => Tlv::new_primitive(Tag::universal(PrimitiveTag::Null), vec![]),
            Element::ObjectIdentifier(oid) => Tlv::new_primitive(
                Tag::universal(PrimitiveTag::ObjectIdentifier),
                oid.to_der_content()?,
            ),
            Element::UTF8String(s) => Tlv::new_primitive(
                Tag::universal(PrimitiveTag::UTF8String),
                s.as_bytes().to_vec(),
            ),
            Element::Sequence(elements) => Tlv::new_constructed(
                Tag::universal(PrimitiveTag::Sequence),
                elements
                    .iter()
                    .map(Element::encode)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Element::Set(elements) => Tlv::new_constructed(
                Tag::universal(PrimitiveTag::Set),
                elements
                    .iter()
                    .map(Element::encode)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Element::PrintableString(s) => Tlv::new_primitive(
                Tag::universal(PrimitiveTag::PrintableString),
                s.as_bytes().to_vec(),
            ),
            Element::IA5String(s) => Tlv::new_primitive(
                Tag::universal(PrimitiveTag::IA5String),
                s.as_bytes().to_vec(),
            ),
            Element::UTCTime(dt) => Tlv::new_primitive(
                Tag::universal(PrimitiveTag::UTCTime),
                dt.format("%y%m%d%H%M%SZ").to_string().into_bytes(),
            ),
            Element::GeneralizedTime(dt) => Tlv::new_primitive(
                Tag::universal(PrimitiveTag::GeneralizedTime),
                dt.format("%Y%m%d%H%M%SZ").to_string().into_bytes(),
            ),
            Element::ContextSpecific {
                slot,
                constructed,
                element,
            } => {
                let tag = Tag::ContextSpecific {
                    slot: *slot,
                    constructed: *constructed,
                };
                let inner = element.encode()?;
                if *constructed {
                    Tlv::new_constructed(tag, vec![inner])
                } else {
                    let data = inner.data().ok_or(Error::ElementCannotEncode(
                        "IMPLICIT tagging of a constructed element",
                    ))?;
                    Tlv::new_primitive(tag, data.to_vec())
                }
            }
            Element::Unimplemented(tlv) => tlv.clone(),
        };
        Ok(tlv)
    }
}

/// ASN.1 INTEGER of arbitrary size.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Integer {
    inner: BigInt,
}

impl Integer {
    pub fn as_bigint(&self) -> &BigInt {
        &self.inner
    }

    pub fn to_u64(&self) -> Option<u64> {
        self.inner.to_u64()
    }

    /// Magnitude in big-endian order without the sign padding octet.
    pub fn to_unsigned_bytes_be(&self) -> Vec<u8> {
        self.inner.to_bytes_be().1
    }

    /// Number of significant bits of the magnitude.
    pub fn bits(&self) -> u64 {
        self.inner.bits()
    }

    pub fn is_positive(&self) -> bool {
        self.inner.sign() == Sign::Plus
    }
}

impl From<&[u8]> for Integer {
    fn from(value: &[u8]) -> Self {
        Integer {
            inner: BigInt::from_signed_bytes_be(value),
        }
    }
}

impl From<BigInt> for Integer {
    fn from(inner: BigInt) -> Self {
        Integer { inner }
    }
}

impl From<u64> for Integer {
    fn from(value: u64) -> Self {
        Integer {
            inner: BigInt::from(value),
        }
    }
}

impl Display for Integer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectIdentifier {
    inner: Vec<u64>,
}

impl ObjectIdentifier {
    /// Content octets of the DER encoding (without tag and length).
    pub fn to_der_content(&self) -> Result<Vec<u8>, Error> {
        let [first, second, rest @ ..] = self.inner.as_slice() else {
            return Err(Error::InvalidObjectIdentifier(
                "at least two arcs are required".to_string(),
            ));
        };
        if *first > 2 || (*first < 2 && *second >= 40) {
            return Err(Error::InvalidObjectIdentifierRoot(*first, *second));
        }
        let root = first
            .checked_mul(40)
            .and_then(|v| v.checked_add(*second))
            .ok_or_else(|| Error::InvalidObjectIdentifier("arc exceeds 64 bits".to_string()))?;

        let mut result = Vec::new();
        push_base128(&mut result, root);
        for v in rest {
            push_base128(&mut result, *v);
        }
        Ok(result)
    }
}

fn push_base128(out: &mut Vec<u8>, value: u64) {
    let mut groups = vec![(value & 0x7f) as u8];
    let mut value = value >> 7;
    while value > 0 {
        groups.push((value & 0x7f) as u8 | 0x80);
        value >>= 7;
    }
    out.extend(groups.iter().rev());
}

impl TryFrom<&[u8]> for ObjectIdentifier {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(Error::EmptyContent("OBJECT IDENTIFIER"));
        }

        let mut subidentifiers = Vec::new();
        let mut val = 0u64;
        let mut pending = false;
        for b in value {
            if val > (u64::MAX >> 7) {
                return Err(Error::InvalidObjectIdentifier(
                    "arc exceeds 64 bits".to_string(),
                ));
            }
            val = (val << 7) | (*b as u64 & 0x7f);
            pending = *b & 0x80 == 0x80;
            if !pending {
                subidentifiers.push(val);
                val = 0;
            }
        }
        if pending {
            // the last octet still had its continuation bit set
            return Err(Error::InvalidObjectIdentifier("truncated arc".to_string()));
        }

        let mut values = Vec::with_capacity(subidentifiers.len() + 1);
        let root = subidentifiers[0];
        match root {
            0..40 => values.extend([0, root]),
            40..80 => values.extend([1, root - 40]),
            _ => values.extend([2, root - 80]),
        }
        values.extend_from_slice(&subidentifiers[1..]);

        Ok(ObjectIdentifier { inner: values })
    }
}

impl Display for ObjectIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self
            .inner
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{}", s)
    }
}

impl FromStr for ObjectIdentifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split('.')
            .map(|c| {
                c.parse::<u64>()
                    .map_err(|_| Error::InvalidObjectIdentifier(format!("invalid arc '{c}'")))
            })
            .collect::<Result<Vec<u64>, Error>>()?;
        if values.len() < 2 {
            return Err(Error::InvalidObjectIdentifier(
                "at least two arcs are required".to_string(),
            ));
        }
        Ok(ObjectIdentifier { inner: values })
    }
}

impl PartialEq<&str> for ObjectIdentifier {
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitString {
    unused: u8,
    data: Vec<u8>,
}

impl BitString {
    pub fn new(unused: u8, data: Vec<u8>) -> Self {
        BitString { unused, data }
    }

    /// Returns the number of unused bits in the last byte
    pub fn unused_bits(&self) -> u8 {
        self.unused
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The unused-bits octet followed by the payload.
    fn to_der_content(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(self.data.len() + 1);
        result.push(self.unused);
        result.extend_from_slice(&self.data);
        result
    }
}

impl TryFrom<&[u8]> for BitString {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        match value.split_first() {
            Some((&unused, data)) => {
                if unused > 7 || (data.is_empty() && unused != 0) {
                    return Err(Error::InvalidUnusedBits(unused));
                }
                Ok(BitString {
                    unused,
                    data: data.to_vec(),
                })
            }
            None => Err(Error::EmptyContent("BIT STRING")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OctetString {
    inner: Vec<u8>,
}

impl OctetString {
    pub fn as_bytes(&self) -> &[u8] {
        &self.inner
    }
}

impl From<Vec<u8>> for OctetString {
    fn from(value: Vec<u8>) -> Self {
        OctetString { inner: value }
    }
}

impl From<&[u8]> for OctetString {
    fn from(value: &[u8]) -> Self {
        OctetString {
            inner: value.to_vec(),
        }
    }
}

fn parse_utc_time(data: &[u8]) -> Result<NaiveDateTime, Error> {
    let s = std::str::from_utf8(data).map_err(|_| Error::InvalidTime("UTCTime"))?;
    let dt = NaiveDateTime::parse_from_str(s, "%y%m%d%H%M%SZ")
        .map_err(|_| Error::InvalidTime("UTCTime"))?;
    // RFC 5280 4.1.2.5.1: YY >= 50 is 19YY, chrono pivots at 69
    if dt.year() >= 2050 {
        return dt.with_year(dt.year() - 100).ok_or(Error::InvalidTime("UTCTime"));
    }
    Ok(dt)
}

fn parse_generalized_time(data: &[u8]) -> Result<NaiveDateTime, Error> {
    let s = std::str::from_utf8(data).map_err(|_| Error::InvalidTime("GeneralizedTime"))?;
    NaiveDateTime::parse_from_str(s, "%Y%m%d%H%M%SZ")
        .map_err(|_| Error::InvalidTime("GeneralizedTime"))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::NaiveDate;
    use der::{Der, PrimitiveTag, Tag, Tlv};
    use keywrap::decoder::Decoder;
    use keywrap::encoder::Encoder;
    use rstest::rstest;

    use crate::error::Error;
    use crate::{ASN1Object, BitString, Element, Integer, ObjectIdentifier, OctetString};

    #[rstest(input, expected,
        case(vec![0x01], "1"),
        case(vec![0x01, 0x00, 0x01], "65537"),
        case(vec![0xff], "-1"),
        case(vec![0x00, 0x80], "128"),
        case(vec![0x03, 0xd4, 0x15, 0x31, 0x8e, 0x2c, 0x57, 0x1d, 0x29, 0x05, 0xfc, 0x3e, 0x05, 0x27, 0x68, 0x9d, 0x0d, 0x09], "333504890676592408951587385614406537514249"),
    )]
    fn test_integer_from_bytes(input: Vec<u8>, expected: &str) {
        let value = Integer::from(input.as_slice());

        assert_eq!(expected, value.to_string());
    }

    #[test]
    fn test_integer_unsigned_bytes_strip_sign_octet() {
        let value = Integer::from(&[0x00, 0xb9, 0x0e][..]);

        assert_eq!(vec![0xb9, 0x0e], value.to_unsigned_bytes_be());
        assert_eq!(16, value.bits());
        assert!(value.is_positive());
    }

    #[rstest(input, expected,
        case(vec![0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x01], "1.2.840.113549.1.1.1"),
        case(vec![0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01], "1.2.840.10045.2.1"),
        case(vec![0x2a, 0x86, 0x48, 0xce, 0x3d, 0x03, 0x01, 0x07], "1.2.840.10045.3.1.7"),
        case(vec![0x2b, 0x81, 0x04, 0x00, 0x22], "1.3.132.0.34"),
        case(vec![0x2b, 0x65, 0x70], "1.3.101.112"),
        case(vec![0x55, 0x04, 0x03], "2.5.4.3"),
        case(vec![0x88, 0x37, 0x03], "2.999.3"),
    )]
    fn test_object_identifier_decode_encode(input: Vec<u8>, expected: &str) {
        let oid = ObjectIdentifier::try_from(input.as_slice()).unwrap();
        assert_eq!(expected, oid.to_string());

        let parsed = ObjectIdentifier::from_str(expected).unwrap();
        assert_eq!(input, parsed.to_der_content().unwrap());
    }

    #[rstest(input,
        case(vec![]),
        case(vec![0x2a, 0x86]),
    )]
    fn test_object_identifier_decode_invalid(input: Vec<u8>) {
        assert!(ObjectIdentifier::try_from(input.as_slice()).is_err());
    }

    #[rstest(input,
        case(""),
        case("1"),
        case("1.2.x"),
        case("1..2"),
    )]
    fn test_object_identifier_from_str_invalid(input: &str) {
        assert!(ObjectIdentifier::from_str(input).is_err());
    }

    #[test]
    fn test_object_identifier_zero_component_encodes() {
        let oid = ObjectIdentifier::from_str("1.3.132.0.35").unwrap();
        assert_eq!(vec![0x2b, 0x81, 0x04, 0x00, 0x23], oid.to_der_content().unwrap());
    }

    #[test]
    fn test_object_identifier_invalid_root() {
        let oid = ObjectIdentifier::from_str("1.45.3").unwrap();
        assert!(matches!(
            oid.to_der_content(),
            Err(Error::InvalidObjectIdentifierRoot(1, 45))
        ));
    }

    #[rstest(input, unused, data,
        case(vec![0x00], 0, vec![]),
        case(vec![0x00, 0x04, 0x01], 0, vec![0x04, 0x01]),
        case(vec![0x06, 0x6e, 0x5d, 0xc0], 6, vec![0x6e, 0x5d, 0xc0]),
    )]
    fn test_bit_string(input: Vec<u8>, unused: u8, data: Vec<u8>) {
        let bs = BitString::try_from(input.as_slice()).unwrap();
        assert_eq!(unused, bs.unused_bits());
        assert_eq!(data, bs.as_bytes());
    }

    #[rstest(input,
        case(vec![]),
        case(vec![0x08, 0x00]),
        case(vec![0x01]),
    )]
    fn test_bit_string_invalid(input: Vec<u8>) {
        assert!(BitString::try_from(input.as_slice()).is_err());
    }

    #[test]
    fn test_decode_algorithm_identifier_sequence() {
        let bytes = vec![
            0x30, 0x0d, 0x06, 0x09, 0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x01, 0x05,
            0x00,
        ];
        let der: Der = bytes.decode().unwrap();
        let asn1: ASN1Object = der.decode().unwrap();

        let expected = Element::Sequence(vec![
            Element::ObjectIdentifier(ObjectIdentifier::from_str("1.2.840.113549.1.1.1").unwrap()),
            Element::Null,
        ]);
        assert_eq!(&[expected], asn1.elements());

        let re_encoded: Der = asn1.encode().unwrap();
        assert_eq!(bytes, re_encoded.encode().unwrap());
    }

    #[rstest(input, expected,
        case(b"260101000000Z".to_vec(), NaiveDate::from_ymd_opt(2026, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()),
        case(b"991231235959Z".to_vec(), NaiveDate::from_ymd_opt(1999, 12, 31).unwrap().and_hms_opt(23, 59, 59).unwrap()),
        case(b"500101000000Z".to_vec(), NaiveDate::from_ymd_opt(1950, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()),
    )]
    fn test_utc_time(input: Vec<u8>, expected: chrono::NaiveDateTime) {
        let tlv = Tlv::new_primitive(Tag::universal(PrimitiveTag::UTCTime), input);
        let element = Element::try_from(&tlv).unwrap();
        assert_eq!(Element::UTCTime(expected), element);
    }

    #[test]
    fn test_context_specific_explicit_round_trip() {
        let element = Element::ContextSpecific {
            slot: 0,
            constructed: true,
            element: Box::new(Element::Integer(Integer::from(2u64))),
        };
        let bytes = element.to_der_bytes().unwrap();
        assert_eq!(vec![0xa0, 0x03, 0x02, 0x01, 0x02], bytes);

        let der: Der = bytes.decode().unwrap();
        let asn1: ASN1Object = der.decode().unwrap();
        assert_eq!(&[element], asn1.elements());
    }

    #[test]
    fn test_context_specific_implicit_keeps_octets() {
        let tlv = Tlv::new_primitive(
            Tag::ContextSpecific {
                slot: 1,
                constructed: false,
            },
            vec![0x00, 0xaa],
        );
        let element = Element::try_from(&tlv).unwrap();
        assert_eq!(
            Element::ContextSpecific {
                slot: 1,
                constructed: false,
                element: Box::new(Element::OctetString(OctetString::from(vec![0x00, 0xaa]))),
            },
            element
        );
    }

    #[test]
    fn test_unimplemented_tag_is_preserved() {
        // BMPString "A"
        let bytes = vec![0x1e, 0x02, 0x00, 0x41];
        let der: Der = bytes.decode().unwrap();
        let asn1: ASN1Object = der.decode().unwrap();
        assert!(matches!(asn1.elements(), [Element::Unimplemented(_)]));
        assert_eq!(bytes, asn1.elements()[0].to_der_bytes().unwrap());
    }
}
