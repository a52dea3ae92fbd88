//! Chain-side boundary for the deployment kit.
//!
//! This crate owns everything the orchestration core needs from "the chain"
//! without owning a chain itself:
//!
//! 1. Transaction lifecycle plumbing ([`tx`]): a submitted transaction is a
//!    [`PendingTx`] carrying two notification channels, hash-known and final
//!    outcome (confirmed receipt or failure).
//! 2. Collaborator traits ([`client`], [`registry`], [`naming`]): the chain
//!    client that binds callable contracts, the package registry that maps a
//!    template id to its deployed address, and the name service that resolves
//!    human-readable organization names.
//! 3. An in-memory backend ([`memory`]) implementing all three, with scripted
//!    outcomes, for tests and local development.

pub mod client;
pub mod memory;
pub mod naming;
pub mod registry;
pub mod tx;

pub use client::{ChainClient, ContractAbi, ContractHandle, SharedChainClient, SharedContract};
pub use naming::{NameService, ResolveError, ResolveOptions, SharedNameService};
pub use registry::{RegistryError, SharedRegistry, TemplateRegistry};
pub use tx::{CallOptions, PendingTx, TxFailure, TxLog, TxNotifier, TxOutcome, TxReceipt};
