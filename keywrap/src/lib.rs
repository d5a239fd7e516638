//! # keywrap
//!
//! Core conversion traits for the keywrap public-key toolkit.
//!
//! Every layer of the toolkit converts one representation of key material
//! into the next one:
//! ```text
//! PEM <-> Vec<u8> <-> DER <-> Element <-> SubjectPublicKeyInfo / Certificate
//! ```
//!
//! Decoding walks this chain to the right through [`decoder::Decoder`],
//! encoding walks it back to the left through [`encoder::Encoder`].
//!
//! ```ignore
//! use keywrap::decoder::Decoder;
//! use keywrap::encoder::Encoder;
//!
//! let der: der::Der = bytes.as_slice().decode()?;
//! let bytes: Vec<u8> = der.encode()?;
//! ```

#![forbid(unsafe_code)]

pub mod decoder;
pub mod encoder;
