//! Shared hex-string value types for the EVM time-travel debugger core.
//!
//! Every byte-string field that crosses a `bus-mapping` API boundary is a
//! lowercase, `0x`-prefixed hex string (the empty string is `"0x"`), and
//! every integer that may exceed 64 bits is rendered the same way, without
//! leading zeros. This crate owns that convention so `bus-mapping` never
//! has to re-derive it.

#![deny(missing_docs)]

use ethers_core::types::{H160, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors raised while parsing or rendering the hex-string value types.
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The input had an odd number of hex characters.
    #[error("odd length hex string")]
    OddLengthHex,
    /// The input contained a byte outside `[0-9a-fA-F]`.
    #[error("non-hex character in hex string")]
    NonHexChar,
}

/// An arbitrary-precision unsigned EVM word (stack item, storage key/value,
/// call value, gas amount), rendered as `"0x"` + lowercase hex with no
/// leading zeros (`"0x0"` for zero).
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Word(pub U256);

impl Word {
    /// The zero word.
    pub const fn zero() -> Self {
        Word(U256::zero())
    }

    /// Build a `Word` from a big-endian byte slice.
    pub fn from_big_endian(bytes: &[u8]) -> Self {
        Word(U256::from_big_endian(bytes))
    }

    /// Render as a fixed 32-byte big-endian buffer.
    pub fn to_be_bytes32(self) -> [u8; 32] {
        let mut buf = [0u8; 32];
        self.0.to_big_endian(&mut buf);
        buf
    }

    /// This word's value as `u64`, saturating at `u64::MAX`.
    pub fn low_u64(self) -> u64 {
        self.0.low_u64()
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word({self})")
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

impl From<u64> for Word {
    fn from(v: u64) -> Self {
        Word(U256::from(v))
    }
}

impl From<U256> for Word {
    fn from(v: U256) -> Self {
        Word(v)
    }
}

impl FromStr for Word {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let stripped = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        let stripped = if stripped.is_empty() { "0" } else { stripped };
        // A `Word` has no forced byte alignment (unlike the disassembler's
        // bytecode input), so an odd-length operand is padded with a
        // leading zero nibble rather than rejected.
        let padded = if stripped.len() % 2 == 1 {
            format!("0{stripped}")
        } else {
            stripped.to_string()
        };
        let bytes = hex::decode(&padded).map_err(|_| Error::NonHexChar)?;
        Ok(Word::from_big_endian(&bytes))
    }
}

impl Serialize for Word {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Word {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Word::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// A 20-byte account address, rendered as `"0x"` + lowercase hex.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub H160);

impl Address {
    /// The zero address.
    pub const fn zero() -> Self {
        Address(H160::zero())
    }

    /// Build an `Address` from a big-endian 20-byte slice.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Address(H160::from_slice(bytes))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0.as_bytes()))
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let stripped = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|_| Error::NonHexChar)?;
        if bytes.len() != 20 {
            return Err(Error::NonHexChar);
        }
        Ok(Address::from_slice(&bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Address::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// A variable-length byte string (bytecode, calldata, return data),
/// rendered as `"0x"` + lowercase hex, `"0x"` for the empty string.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
    /// Construct from a raw byte vector.
    pub fn new(bytes: Vec<u8>) -> Self {
        Bytes(bytes)
    }

    /// Borrow the underlying bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Consume into the underlying bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    /// Number of bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the empty byte string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bytes({self})")
    }
}

impl fmt::Display for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(v: Vec<u8>) -> Self {
        Bytes(v)
    }
}

impl FromStr for Bytes {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let stripped = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        if stripped.len() % 2 != 0 {
            return Err(Error::OddLengthHex);
        }
        let bytes = hex::decode(stripped).map_err(|_| Error::NonHexChar)?;
        Ok(Bytes(bytes))
    }
}

impl Serialize for Bytes {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Bytes {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Bytes::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_renders_without_leading_zeros() {
        assert_eq!(Word::from(0x42u64).to_string(), "0x42");
        assert_eq!(Word::zero().to_string(), "0x0");
    }

    #[test]
    fn word_roundtrips_through_str() {
        let w = Word::from_str("0x1234abcd").unwrap();
        assert_eq!(w.to_string(), "0x1234abcd");
    }

    #[test]
    fn bytes_empty_is_0x() {
        assert_eq!(Bytes::default().to_string(), "0x");
    }

    #[test]
    fn bytes_rejects_odd_length() {
        assert_eq!(Bytes::from_str("0x0"), Err(Error::OddLengthHex));
    }

    #[test]
    fn address_roundtrips() {
        let a = Address::from_str("0x000000000000000000000000000000000000aa").unwrap();
        assert_eq!(a.to_string(), "0x000000000000000000000000000000000000aa");
    }
}
