//! Chain account/contract addresses.
//!
//! A 20-byte address with `0x`-prefixed hex representation. The all-zero
//! address is a sentinel meaning "unassigned" in the naming registry, so it
//! gets first-class support (`Address::ZERO`, [`Address::is_zero`]).

use serde::{Deserialize, Serialize};

/// Length of a raw address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// A 20-byte chain address.
///
/// Displays as `0x` + 40 lowercase hex characters and serializes as that
/// string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; ADDRESS_LEN]);

/// Error type for address parsing.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AddressError {
    #[error("invalid address length: expected {expected} hex chars, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("invalid hex in address: {0}")]
    InvalidHex(String),
}

impl Address {
    /// The all-zero sentinel address ("unassigned").
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    /// Create an address from raw bytes.
    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Address(bytes)
    }

    /// Parse an address from hex, with or without the `0x` prefix.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let hex_part = s.strip_prefix("0x").unwrap_or(s);

        if hex_part.len() != ADDRESS_LEN * 2 {
            return Err(AddressError::InvalidLength {
                expected: ADDRESS_LEN * 2,
                got: hex_part.len(),
            });
        }

        let raw = hex::decode(hex_part).map_err(|e| AddressError::InvalidHex(e.to_string()))?;

        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&raw);
        Ok(Address(bytes))
    }

    /// Whether this is the all-zero sentinel.
    pub fn is_zero(&self) -> bool {
        *self == Address::ZERO
    }

    /// Raw bytes of the address.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl std::str::FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Address::parse(&s)
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> String {
        addr.to_string()
    }
}
