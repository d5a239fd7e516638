// https://datatracker.ietf.org/doc/html/rfc5280#section-4.1.2.4
/*
Name ::= CHOICE { -- only one possibility for now --
    rdnSequence  RDNSequence }

RDNSequence ::= SEQUENCE OF RelativeDistinguishedName

RelativeDistinguishedName ::= SET SIZE (1..MAX) OF AttributeTypeAndValue

AttributeTypeAndValue ::= SEQUENCE {
    type     AttributeType,
    value    AttributeValue }
*/

use std::fmt::Display;

use asn1::{Element, ObjectIdentifier};
use keywrap::decoder::{DecodableFrom, Decoder};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    rdn_sequence: Vec<RelativeDistinguishedName>,
}

impl Name {
    pub fn rdn_sequence(&self) -> &[RelativeDistinguishedName] {
        &self.rdn_sequence
    }

    /// Value of the first attribute with the given type.
    pub fn attribute(&self, oid: &str) -> Option<&str> {
        self.rdn_sequence
            .iter()
            .flat_map(|rdn| rdn.attributes.iter())
            .find(|attr| attr.attribute_type == oid)
            .map(|attr| attr.attribute_value.as_str())
    }

    pub fn common_name(&self) -> Option<&str> {
        self.attribute(AttributeTypeAndValue::OID_COMMON_NAME)
    }
}

impl Display for Name {
    /// `C=ES, O=Example, CN=host`, in encoding order.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts = self
            .rdn_sequence
            .iter()
            .flat_map(|rdn| rdn.attributes.iter())
            .map(|attr| attr.to_string())
            .collect::<Vec<_>>();
        write!(f, "{}", parts.join(", "))
    }
}

impl DecodableFrom<Element> for Name {}

impl Decoder<Element, Name> for Element {
    type Error = Error;

    fn decode(&self) -> Result<Name> {
        match self {
            Element::Sequence(elements) => {
                let rdn_sequence = elements
                    .iter()
                    .map(|elem| elem.decode())
                    .collect::<Result<Vec<RelativeDistinguishedName>>>()?;
                Ok(Name { rdn_sequence })
            }
            _ => Err(Error::InvalidName("expected Sequence for Name".to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativeDistinguishedName {
    attributes: Vec<AttributeTypeAndValue>,
}

impl RelativeDistinguishedName {
    pub fn attributes(&self) -> &[AttributeTypeAndValue] {
        &self.attributes
    }
}

impl DecodableFrom<Element> for RelativeDistinguishedName {}

impl Decoder<Element, RelativeDistinguishedName> for Element {
    type Error = Error;

    fn decode(&self) -> Result<RelativeDistinguishedName> {
        match self {
            Element::Set(elements) if !elements.is_empty() => {
                let attributes = elements
                    .iter()
                    .map(|elem| elem.decode())
                    .collect::<Result<Vec<AttributeTypeAndValue>>>()?;
                Ok(RelativeDistinguishedName { attributes })
            }
            Element::Set(_) => Err(Error::InvalidRelativeDistinguishedName(
                "empty Set".to_string(),
            )),
            _ => Err(Error::InvalidRelativeDistinguishedName(
                "expected Set for RelativeDistinguishedName".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeTypeAndValue {
    attribute_type: ObjectIdentifier,
    attribute_value: String,
}

impl AttributeTypeAndValue {
    pub const OID_COMMON_NAME: &'static str = "2.5.4.3";
    pub const OID_COUNTRY_NAME: &'static str = "2.5.4.6";
    pub const OID_LOCALITY_NAME: &'static str = "2.5.4.7";
    pub const OID_STATE_OR_PROVINCE_NAME: &'static str = "2.5.4.8";
    pub const OID_ORGANIZATION_NAME: &'static str = "2.5.4.10";
    pub const OID_ORGANIZATIONAL_UNIT_NAME: &'static str = "2.5.4.11";
    pub const OID_EMAIL_ADDRESS: &'static str = "1.2.840.113549.1.9.1";

    pub fn attribute_type(&self) -> &ObjectIdentifier {
        &self.attribute_type
    }

    pub fn attribute_value(&self) -> &str {
        &self.attribute_value
    }

    /// Short name used when printing, e.g. `CN`.
    pub fn short_name(&self) -> Option<&'static str> {
        match self.attribute_type.to_string().as_str() {
            Self::OID_COMMON_NAME => Some("CN"),
            Self::OID_COUNTRY_NAME => Some("C"),
            Self::OID_LOCALITY_NAME => Some("L"),
            Self::OID_STATE_OR_PROVINCE_NAME => Some("ST"),
            Self::OID_ORGANIZATION_NAME => Some("O"),
            Self::OID_ORGANIZATIONAL_UNIT_NAME => Some("OU"),
            Self::OID_EMAIL_ADDRESS => Some("emailAddress"),
            _ => None,
        }
    }
}

impl Display for AttributeTypeAndValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.short_name() {
            Some(name) => write!(f, "{}={}", name, self.attribute_value),
            None => write!(f, "{}={}", self.attribute_type, self.attribute_value),
        }
    }
}

impl DecodableFrom<Element> for AttributeTypeAndValue {}

impl Decoder<Element, AttributeTypeAndValue> for Element {
    type Error = Error;

    fn decode(&self) -> Result<AttributeTypeAndValue> {
        let Element::Sequence(seq) = self else {
            return Err(Error::InvalidAttributeTypeAndValue(
                "expected Sequence".to_string(),
            ));
        };
        let [attribute_type, value] = seq.as_slice() else {
            return Err(Error::InvalidAttributeTypeAndValue(format!(
                "expected 2 elements in sequence, got {}",
                seq.len()
            )));
        };
        let Element::ObjectIdentifier(attribute_type) = attribute_type else {
            return Err(Error::InvalidAttributeTypeAndValue(
                "expected ObjectIdentifier for type".to_string(),
            ));
        };

        // DirectoryString choices; anything else is kept as hex
        let attribute_value = match value {
            Element::UTF8String(s) | Element::PrintableString(s) | Element::IA5String(s) => {
                s.clone()
            }
            other => {
                let bytes = other.to_der_bytes()?;
                let hex = bytes
                    .iter()
                    .map(|b| format!("{b:02x}"))
                    .collect::<String>();
                format!("#{hex}")
            }
        };

        Ok(AttributeTypeAndValue {
            attribute_type: attribute_type.clone(),
            attribute_value,
        })
    }
}
