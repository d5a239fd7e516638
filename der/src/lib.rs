use keywrap::decoder::{DecodableFrom, Decoder};
use keywrap::encoder::{EncodableTo, Encoder};
use nom::error::ErrorKind;
use nom::{IResult, Parser};

pub mod error;

use error::Error;

/// Identifier octet bit marking a constructed encoding.
pub const TAG_CONSTRUCTED: u8 = 0x20;

const TAG_CLASS_MASK: u8 = 0xc0;
const TAG_CLASS_UNIVERSAL: u8 = 0x00;
const TAG_CLASS_CONTEXT_SPECIFIC: u8 = 0x80;
const TAG_NUMBER_MASK: u8 = 0x1f;

// Certificates nest a handful of levels. Anything deeper is hostile input.
const MAX_DEPTH: usize = 32;

/// A sequence of top-level TLVs read from (or written to) a DER byte string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Der {
    elements: Vec<Tlv>,
}

impl Der {
    pub fn new(elements: Vec<Tlv>) -> Self {
        Der { elements }
    }

    pub fn elements(&self) -> &[Tlv] {
        &self.elements
    }
}

impl DecodableFrom<&[u8]> for Der {}

impl Decoder<&[u8], Der> for &[u8] {
    type Error = Error;

    fn decode(&self) -> Result<Der, Self::Error> {
        if self.is_empty() {
            return Err(Error::EmptyInput);
        }
        let mut input: &[u8] = self;
        let mut elements = Vec::new();
        while !input.is_empty() {
            let (rest, tlv) = Tlv::parse(input, 0)?;
            input = rest;
            elements.push(tlv);
        }
        Ok(Der { elements })
    }
}

impl DecodableFrom<Vec<u8>> for Der {}

impl Decoder<Vec<u8>, Der> for Vec<u8> {
    type Error = Error;

    fn decode(&self) -> Result<Der, Self::Error> {
        self.as_slice().decode()
    }
}

impl EncodableTo<Der> for Vec<u8> {}

impl Encoder<Der, Vec<u8>> for Der {
    type Error = Error;

    fn encode(&self) -> Result<Vec<u8>, Self::Error> {
        let mut out = Vec::new();
        for tlv in &self.elements {
            tlv.write_to(&mut out);
        }
        Ok(out)
    }
}

/// Universal class tags understood by the toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTag {
    Boolean,
    Integer,
    BitString,
    OctetString,
    Null,
    ObjectIdentifier,
    UTF8String,
    Sequence,
    Set,
    PrintableString,
    IA5String,
    UTCTime,
    GeneralizedTime,
    /// Any other identifier octet, kept verbatim.
    Unimplemented(u8),
}

impl From<u8> for PrimitiveTag {
    /// Maps a universal tag number (identifier octet without class and
    /// constructed bits) to a tag.
    fn from(value: u8) -> Self {
        match value {
            0x01 => Self::Boolean,
            0x02 => Self::Integer,
            0x03 => Self::BitString,
            0x04 => Self::OctetString,
            0x05 => Self::Null,
            0x06 => Self::ObjectIdentifier,
            0x0c => Self::UTF8String,
            0x10 => Self::Sequence,
            0x11 => Self::Set,
            0x13 => Self::PrintableString,
            0x16 => Self::IA5String,
            0x17 => Self::UTCTime,
            0x18 => Self::GeneralizedTime,
            _ => Self::Unimplemented(value),
        }
    }
}

impl From<&PrimitiveTag> for u8 {
    fn from(value: &PrimitiveTag) -> Self {
        match value {
            PrimitiveTag::Boolean => 0x01,
            PrimitiveTag::Integer => 0x02,
            PrimitiveTag::BitString => 0x03,
            PrimitiveTag::OctetString => 0x04,
            PrimitiveTag::Null => 0x05,
            PrimitiveTag::ObjectIdentifier => 0x06,
            PrimitiveTag::UTF8String => 0x0c,
            PrimitiveTag::Sequence => 0x10,
            PrimitiveTag::Set => 0x11,
            PrimitiveTag::PrintableString => 0x13,
            PrimitiveTag::IA5String => 0x16,
            PrimitiveTag::UTCTime => 0x17,
            PrimitiveTag::GeneralizedTime => 0x18,
            PrimitiveTag::Unimplemented(v) => *v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// Universal (or otherwise uninterpreted) tag together with the raw
    /// identifier octet it is written as.
    Primitive(PrimitiveTag, u8),
    ContextSpecific { slot: u8, constructed: bool },
}

impl Tag {
    /// Universal tag with the identifier octet DER uses for it.
    pub fn universal(tag: PrimitiveTag) -> Self {
        let number = u8::from(&tag);
        match tag {
            PrimitiveTag::Sequence | PrimitiveTag::Set => Tag::Primitive(tag, number | TAG_CONSTRUCTED),
            _ => Tag::Primitive(tag, number),
        }
    }

    pub fn is_constructed(&self) -> bool {
        match self {
            Tag::Primitive(_, raw) => raw & TAG_CONSTRUCTED == TAG_CONSTRUCTED,
            Tag::ContextSpecific { constructed, .. } => *constructed,
        }
    }
}

impl From<u8> for Tag {
    fn from(value: u8) -> Self {
        match value & TAG_CLASS_MASK {
            TAG_CLASS_UNIVERSAL => {
                Tag::Primitive(PrimitiveTag::from(value & TAG_NUMBER_MASK), value)
            }
            TAG_CLASS_CONTEXT_SPECIFIC => Tag::ContextSpecific {
                slot: value & TAG_NUMBER_MASK,
                constructed: value & TAG_CONSTRUCTED == TAG_CONSTRUCTED,
            },
            // application and private classes are carried through untouched
            _ => Tag::Primitive(PrimitiveTag::Unimplemented(value), value),
        }
    }
}

impl From<&Tag> for u8 {
    fn from(value: &Tag) -> Self {
        match value {
            Tag::Primitive(_, raw) => *raw,
            Tag::ContextSpecific { slot, constructed } => {
                let mut b = TAG_CLASS_CONTEXT_SPECIFIC | (slot & TAG_NUMBER_MASK);
                if *constructed {
                    b |= TAG_CONSTRUCTED;
                }
                b
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tlv {
    tag: Tag,
    length: u64,
    value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Tlv(Vec<Tlv>),
    Data(Vec<u8>),
}

impl Tlv {
    pub fn new_primitive(tag: Tag, data: Vec<u8>) -> Self {
        Tlv {
            tag,
            length: data.len() as u64,
            value: Value::Data(data),
        }
    }

    /// Builds a constructed TLV. The length covers the complete encoding of
    /// every child, length octets included.
    pub fn new_constructed(tag: Tag, tlvs: Vec<Tlv>) -> Self {
        let length = tlvs.iter().map(Tlv::encoded_len).sum();
        Tlv {
            tag,
            length,
            value: Value::Tlv(tlvs),
        }
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn data(&self) -> Option<&[u8]> {
        match &self.value {
            Value::Data(data) => Some(data),
            Value::Tlv(_) => None,
        }
    }

    pub fn tlvs(&self) -> Option<&[Tlv]> {
        match &self.value {
            Value::Tlv(tlvs) => Some(tlvs),
            Value::Data(_) => None,
        }
    }

    /// Size of the full encoding: identifier, length octets and contents.
    pub fn encoded_len(&self) -> u64 {
        1 + encode_length(self.length).len() as u64 + self.length
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.push(u8::from(&self.tag));
        out.extend(encode_length(self.length));
        match &self.value {
            Value::Data(data) => out.extend_from_slice(data),
            Value::Tlv(tlvs) => {
                for tlv in tlvs {
                    tlv.write_to(out);
                }
            }
        }
    }

    fn parse(input: &[u8], depth: usize) -> IResult<&[u8], Tlv> {
        if depth > MAX_DEPTH {
            return Err(nom::Err::Failure(nom::error::Error::new(
                input,
                ErrorKind::TooLarge,
            )));
        }
        let (input, tag) = parse_tag(input)?;
        let (input, length) = parse_length(input)?;
        let size = usize::try_from(length).map_err(|_| {
            nom::Err::Failure(nom::error::Error::new(input, ErrorKind::TooLarge))
        })?;
        let (input, data) = nom::bytes::complete::take(size).parse(input)?;

        if tag.is_constructed() {
            // parse TLV recursively.
            let mut tlvs = Vec::new();
            let mut data = data;
            while !data.is_empty() {
                let (rest, v) = Self::parse(data, depth + 1)?;
                data = rest;
                tlvs.push(v);
            }

            return Ok((
                input,
                Tlv {
                    tag,
                    length,
                    value: Value::Tlv(tlvs),
                },
            ));
        }

        Ok((
            input,
            Tlv {
                tag,
                length,
                value: Value::Data(data.to_vec()),
            },
        ))
    }
}

fn parse_tag(input: &[u8]) -> IResult<&[u8], Tag> {
    let (rest, n) = nom::number::complete::be_u8(input)?;
    if n & TAG_NUMBER_MASK == TAG_NUMBER_MASK {
        // high tag number form does not occur in the structures handled here
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            ErrorKind::Tag,
        )));
    }
    Ok((rest, Tag::from(n)))
}

fn parse_length(input: &[u8]) -> IResult<&[u8], u64> {
    let (input, n) = nom::number::complete::be_u8(input)?;
    if n & 0x80 == 0x80 {
        // long form
        // First 1 bit is a marker for long form.
        // Other bits represent bytes length of the length field.
        let count = n & 0x7f;
        if count == 0 || count > 8 {
            // 0x80 is the BER indefinite form, forbidden in DER
            return Err(nom::Err::Error(nom::error::Error::new(
                input,
                ErrorKind::LengthValue,
            )));
        }
        let (rest, bs) = nom::bytes::complete::take(count).parse(input)?;
        let n = bs.iter().fold(0u64, |n, &b| (n << 8) | b as u64);
        // DER requires the minimal encoding: no leading zero octets and no
        // long form for lengths that fit the short form
        if bs[0] == 0 || n < 0x80 {
            return Err(nom::Err::Error(nom::error::Error::new(
                input,
                ErrorKind::LengthValue,
            )));
        }
        return Ok((rest, n));
    }
    // short form: 0-127
    Ok((input, n as u64))
}

/// Encodes a content length: short form below 128, otherwise `0x80 | count`
/// followed by the minimal big-endian length octets.
pub fn encode_length(length: u64) -> Vec<u8> {
    if length < 0x80 {
        return vec![length as u8];
    }
    let bytes = length.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    let significant = &bytes[skip..];
    let mut out = Vec::with_capacity(significant.len() + 1);
    out.push(0x80 | significant.len() as u8);
    out.extend_from_slice(significant);
    out
}

#[cfg(test)]
mod tests {
    use keywrap::decoder::Decoder;
    use keywrap::encoder::Encoder;
    use rstest::rstest;

    use crate::error::Error;
    use crate::{Der, PrimitiveTag, Tag, Tlv, Value, encode_length, parse_length, parse_tag};

    #[rstest(input, expected,
        case(vec![0x02], Tag::Primitive(PrimitiveTag::Integer, 0x02)),
        case(vec![0x02, 0x01], Tag::Primitive(PrimitiveTag::Integer, 0x02)),
        case(vec![0x30, 0x01], Tag::Primitive(PrimitiveTag::Sequence, 0x30)),
        case(vec![0xa0, 0x03], Tag::ContextSpecific { slot: 0, constructed: true }),
        case(vec![0x81, 0x01], Tag::ContextSpecific { slot: 1, constructed: false }),
        case(vec![0x61], Tag::Primitive(PrimitiveTag::Unimplemented(0x61), 0x61)),
    )]
    fn test_parse_tag(input: Vec<u8>, expected: Tag) {
        let actual = parse_tag(&input).unwrap();

        assert_eq!(expected, actual.1);
    }

    #[test]
    fn test_parse_tag_rejects_high_tag_number() {
        assert!(parse_tag(&[0x1f, 0x81, 0x00]).is_err());
    }

    #[rstest(input, expected,
        case(vec![0x02], 0x02),
        case(vec![0x02, 0x01], 0x02),
        case(vec![0x30, 0x01], 0x30),
        case(vec![0x81, 0x80], 0x80),
        case(vec![0x82, 0x02, 0x10], 256 * 0x02 + 0x10),
        case(vec![0x83, 0x01, 0x00, 0x00], 256 * 256),
        case(vec![0x82, 0xff, 0xff], 256 * 0xff + 0xff),
    )]
    fn test_parse_length(input: Vec<u8>, expected: u64) {
        let actual = parse_length(&input).unwrap();

        assert_eq!(expected, actual.1);
    }

    #[rstest(input,
        case(vec![0x80]),
        case(vec![0x89, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]),
        case(vec![0x82, 0x01]),
        case(vec![0x81, 0x7f]),
        case(vec![0x82, 0x00, 0x80]),
    )]
    fn test_parse_length_invalid(input: Vec<u8>) {
        assert!(parse_length(&input).is_err());
    }

    #[rstest(length, expected,
        case(0, vec![0x00]),
        case(65, vec![0x41]),
        case(127, vec![0x7f]),
        case(128, vec![0x81, 0x80]),
        case(255, vec![0x81, 0xff]),
        case(256, vec![0x82, 0x01, 0x00]),
        case(270, vec![0x82, 0x01, 0x0e]),
        case(65535, vec![0x82, 0xff, 0xff]),
        case(65536, vec![0x83, 0x01, 0x00, 0x00]),
    )]
    fn test_encode_length(length: u64, expected: Vec<u8>) {
        assert_eq!(expected, encode_length(length));
    }

    #[rstest(input, expected,
        case(vec![0x02, 0x01, 0x01], Tlv{tag: Tag::from(0x02), length: 1, value: Value::Data(vec![0x01])}),
        case(vec![0x02, 0x09, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01], Tlv{tag: Tag::from(0x02), length: 9, value: Value::Data(vec![0x00, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01])}),
        case(vec![0x13, 0x02, 0x68, 0x69], Tlv{tag: Tag::from(0x13), length: 2, value: Value::Data(vec![0x68, 0x69])}),
        case(vec![0x0c, 0x04, 0xf0, 0x9f, 0x98, 0x8e], Tlv{tag: Tag::from(0x0c), length: 4, value: Value::Data(vec![0xf0, 0x9f, 0x98, 0x8e])}),
        case(vec![0x06, 0x09, 0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x01], Tlv { tag: Tag::from(0x06), length: 9, value: Value::Data(vec![0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x01]) }),
        case(vec![0x05, 0x00], Tlv { tag: Tag::from(0x05), length: 0, value: Value::Data(vec![]) }),
        case(vec![0x03, 0x04, 0x00, 0x04, 0x01, 0x02], Tlv { tag: Tag::from(0x03), length: 4, value: Value::Data(vec![0x00, 0x04, 0x01, 0x02]) })
    )]
    fn test_tlv_parse_primitive(input: Vec<u8>, expected: Tlv) {
        let (rest, actual) = Tlv::parse(&input, 0).unwrap();
        assert!(rest.is_empty());
        assert_eq!(expected, actual);
    }

    #[test]
    fn test_tlv_parse_structured() {
        let input = vec![0x30, 0x09, 0x02, 0x01, 0x07, 0x02, 0x01, 0x08, 0x02, 0x01, 0x09];
        let (_, actual) = Tlv::parse(&input, 0).unwrap();

        assert_eq!(Tag::Primitive(PrimitiveTag::Sequence, 0x30), *actual.tag());
        assert_eq!(9, actual.length());
        let children = actual.tlvs().expect("expected constructed value");
        let values: Vec<&[u8]> = children.iter().filter_map(Tlv::data).collect();
        assert_eq!(vec![&[0x07][..], &[0x08][..], &[0x09][..]], values);
    }

    #[test]
    fn test_tlv_parse_context_specific_explicit() {
        // [0] EXPLICIT INTEGER 2, the version field of a v3 certificate
        let input = vec![0xa0, 0x03, 0x02, 0x01, 0x02];
        let (_, actual) = Tlv::parse(&input, 0).unwrap();

        assert_eq!(Tag::ContextSpecific { slot: 0, constructed: true }, *actual.tag());
        let inner = actual.tlvs().unwrap();
        assert_eq!(1, inner.len());
        assert_eq!(Some(&[0x02][..]), inner[0].data());
    }

    #[test]
    fn test_constructed_length_counts_encoded_children() {
        let payload = vec![0xab; 200];
        let bit_string = Tlv::new_primitive(Tag::universal(PrimitiveTag::BitString), payload);
        let seq = Tlv::new_constructed(Tag::universal(PrimitiveTag::Sequence), vec![bit_string]);

        // 1 tag + 2 length octets (0x81 0xc8) + 200 content octets
        assert_eq!(203, seq.length());
        let bytes = seq.to_bytes();
        assert_eq!(&[0x30, 0x81, 0xcb, 0x03, 0x81, 0xc8], &bytes[..6]);
        assert_eq!(206, bytes.len());
    }

    #[rstest(input,
        case(vec![0x30, 0x03, 0x02, 0x01, 0x05]),
        case(vec![0x30, 0x05, 0x06, 0x01, 0x2a, 0x05, 0x00]),
        case([vec![0x04, 0x81, 0x80], vec![0x11; 128]].concat()),
    )]
    fn test_der_round_trip_canonical(input: Vec<u8>) {
        let der: Der = input.decode().unwrap();
        let encoded: Vec<u8> = der.encode().unwrap();
        assert_eq!(input, encoded);
    }

    #[rstest(input,
        case(vec![]),
        case(vec![0x30]),
        case(vec![0x30, 0x05, 0x02, 0x01]),
        case(vec![0x30, 0x03, 0x02, 0x05, 0x01]),
        case(vec![0x30, 0x80, 0x02, 0x01, 0x01, 0x00, 0x00]),
        case(vec![0x30, 0x81, 0x03, 0x02, 0x01, 0x05]),
        case(vec![0x30, 0x82, 0x00, 0x03, 0x02, 0x01, 0x05]),
    )]
    fn test_der_decode_malformed(input: Vec<u8>) {
        let der: Result<Der, Error> = input.decode();
        assert!(der.is_err());
    }

    #[test]
    fn test_der_decode_rejects_deep_nesting() {
        let mut input = vec![0x05, 0x00];
        for _ in 0..40 {
            let mut wrapped = vec![0x30, input.len() as u8];
            wrapped.extend(input);
            input = wrapped;
        }
        let der: Result<Der, Error> = input.decode();
        assert!(der.is_err());
    }
}
