//! Algorithm Parameters
//!
//! Typed readers for the `parameters` field of an AlgorithmIdentifier:
//! - [RFC 3279](https://datatracker.ietf.org/doc/html/rfc3279) - RSA (NULL)
//! - [RFC 5480](https://datatracker.ietf.org/doc/html/rfc5480) - Elliptic Curve Cryptography

use asn1::Element;

use crate::error::Result;

pub mod ec;

/// Algorithm-specific parameters that can be read from the raw element.
pub trait AlgorithmParameter: Sized {
    fn parse(raw: &RawAlgorithmParameter) -> Result<Self>;
}

/// The parameters element exactly as it appeared in the encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAlgorithmParameter {
    element: Element,
}

impl RawAlgorithmParameter {
    pub fn new(element: Element) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }
}

impl From<Element> for RawAlgorithmParameter {
    fn from(element: Element) -> Self {
        Self::new(element)
    }
}
