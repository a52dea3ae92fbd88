//! Shared foundation types for the deployment kit.
//!
//! Everything here is chain-agnostic data: account/contract addresses and the
//! value shapes passed to contract method calls. No I/O, no async.

pub mod address;
pub mod value;

pub use address::{Address, AddressError};
pub use value::CallValue;
