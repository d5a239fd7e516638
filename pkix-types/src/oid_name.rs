//! Trait for types that have OIDs with conventional names

/// Human-readable names for well-known OIDs, e.g. `secp256r1` for
/// `1.2.840.10045.3.1.7`.
pub trait OidName {
    /// Returns the conventional name for this type's OID, if it has one
    fn oid_name(&self) -> Option<&'static str>;
}
