//! Chain client abstraction.
//!
//! The client binds an interface description and a deployed address into a
//! callable contract handle. The handle's `submit` is the side-effecting
//! operation: it signs and broadcasts a transaction and hands back the
//! [`PendingTx`] lifecycle channels.

use std::sync::Arc;

use common::{Address, CallValue};
use serde::{Deserialize, Serialize};

use crate::tx::{CallOptions, PendingTx};

/// Opaque contract interface description (ABI-like).
///
/// The orchestration core never interprets this; it is resolved from the
/// template catalog and passed through to the chain client unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAbi(serde_json::Value);

impl ContractAbi {
    pub fn from_json(raw: serde_json::Value) -> Self {
        ContractAbi(raw)
    }

    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }
}

/// A callable contract bound to a deployed address.
pub trait ContractHandle: Send + Sync {
    /// Deployed address this handle is bound to.
    fn address(&self) -> Address;

    /// Sign and broadcast a method call.
    ///
    /// Submission itself is the side effect (real fee cost); callers must not
    /// submit more than once per desired transaction. Submission problems are
    /// reported through the returned lifecycle channels, not synchronously.
    fn submit(&self, method: &str, args: &[CallValue], opts: &CallOptions) -> PendingTx;
}

/// Connection to a chain, able to bind callable contracts.
pub trait ChainClient: Send + Sync {
    /// The signing account used for submissions (`from`).
    fn sender(&self) -> Address;

    /// Bind a callable contract from an interface description and address.
    fn bind_contract(&self, abi: &ContractAbi, address: Address) -> SharedContract;
}

/// Type alias for shared chain client reference.
pub type SharedChainClient = Arc<dyn ChainClient>;

/// Type alias for shared contract handle reference.
pub type SharedContract = Arc<dyn ContractHandle>;
