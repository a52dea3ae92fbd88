//! Name resolution collaborator.
//!
//! Human-readable organization names live in a naming registry; resolving one
//! yields the address it points at. A name that was registered but never
//! assigned resolves to the zero address; a name that was never registered at
//! all fails with [`ResolveError::NotRegistered`]. The two conditions are kept
//! distinguishable so callers can log them apart.

use std::sync::Arc;

use async_trait::async_trait;
use common::Address;
use serde::{Deserialize, Serialize};

/// Configuration passed through to the resolver backend unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveOptions {
    /// Connectivity handle for the backend (e.g. a provider URL).
    pub endpoint: String,
    /// Address of the naming registry contract to resolve against.
    pub registry: Address,
}

/// Error type for name resolution.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResolveError {
    /// The name was never registered in the naming system.
    #[error("name not registered")]
    NotRegistered,

    /// Any other resolution failure (connectivity, malformed response, ...).
    #[error("resolver backend failure: {0}")]
    Backend(String),
}

/// Domain-name-to-address resolution service.
#[async_trait]
pub trait NameService: Send + Sync {
    /// Resolve a fully-qualified name to an address.
    async fn resolve(&self, fqdn: &str, opts: &ResolveOptions) -> Result<Address, ResolveError>;
}

/// Type alias for shared name service reference.
pub type SharedNameService = Arc<dyn NameService>;
