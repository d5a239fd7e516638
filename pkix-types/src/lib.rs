//! PKIX (Public Key Infrastructure using X.509) types shared by the key
//! encoder and the certificate reader.
//!
//! Defined in:
//! - RFC 5280: Internet X.509 Public Key Infrastructure Certificate and CRL Profile
//! - RFC 3279 / RFC 5480: algorithm identifiers for RSA and elliptic curve keys

pub mod algorithm;
pub mod error;
pub mod oid_name;
pub mod subject_public_key_info;

pub use algorithm::parameters::ec::NamedCurve;
pub use algorithm::parameters::{AlgorithmParameter, RawAlgorithmParameter};
pub use algorithm::{AlgorithmIdentifier, AlgorithmParameters};
pub use error::{Error, Result};
pub use oid_name::OidName;
pub use subject_public_key_info::SubjectPublicKeyInfo;
