//! Values passed as contract call arguments.
//!
//! Deployment parameters arrive from the caller as an ordered list matching
//! the template's declared parameter names. The kit never validates them
//! against a schema; it only carries them to the contract call.

use serde::{Deserialize, Serialize};

use crate::Address;

/// A single contract call argument.
///
/// Unsigned integers are carried as `u128`, which covers the 10^18-base
/// fixed-point percentages and token stakes used by governance templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CallValue {
    /// UTF-8 text (names, symbols).
    Text(String),
    /// Unsigned integer (stakes, percentages, durations).
    Uint(u128),
    /// A single address.
    Address(Address),
    /// An ordered list of addresses (e.g. token holders, signers).
    AddressList(Vec<Address>),
    /// An ordered list of unsigned integers (e.g. stakes).
    UintList(Vec<u128>),
}

impl CallValue {
    /// Short tag describing the variant, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CallValue::Text(_) => "text",
            CallValue::Uint(_) => "uint",
            CallValue::Address(_) => "address",
            CallValue::AddressList(_) => "address_list",
            CallValue::UintList(_) => "uint_list",
        }
    }
}

impl From<&str> for CallValue {
    fn from(s: &str) -> Self {
        CallValue::Text(s.to_string())
    }
}

impl From<u128> for CallValue {
    fn from(v: u128) -> Self {
        CallValue::Uint(v)
    }
}

impl From<Address> for CallValue {
    fn from(addr: Address) -> Self {
        CallValue::Address(addr)
    }
}
