//! Decoder trait for type-safe conversions.
//!
//! `Decoder<T, D>` converts a source `T` into a destination `D`. The
//! destination must opt in through the `DecodableFrom<T>` marker, so only
//! conversions that a crate explicitly declares are callable.
//!
//! ```no_run
//! use keywrap::decoder::{DecodableFrom, Decoder};
//!
//! struct Raw(Vec<u8>);
//! struct Text(String);
//!
//! #[derive(Debug)]
//! struct Invalid;
//!
//! impl DecodableFrom<Raw> for Text {}
//!
//! impl Decoder<Raw, Text> for Raw {
//!     type Error = Invalid;
//!
//!     fn decode(&self) -> Result<Text, Self::Error> {
//!         String::from_utf8(self.0.clone()).map(Text).map_err(|_| Invalid)
//!     }
//! }
//! ```

/// Converts `self` (of type `T`) into `D`.
pub trait Decoder<T, D: DecodableFrom<T>> {
    /// The error type returned when decoding fails.
    type Error;

    /// Decodes `self` into type `D`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a valid representation of `D`.
    fn decode(&self) -> Result<D, Self::Error>;
}

/// Marker trait indicating that type `D` can be decoded from type `T`.
pub trait DecodableFrom<T> {}
