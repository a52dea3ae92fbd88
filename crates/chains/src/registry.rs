//! Package registry collaborator.
//!
//! Templates are published to a registry under a stable id; the registry maps
//! that id to the currently deployed contract address.

use std::sync::Arc;

use async_trait::async_trait;
use common::Address;

/// Error type for registry lookups.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    #[error("registry backend failure: {0}")]
    Backend(String),
}

/// Directory service mapping a template id to its deployed contract.
#[async_trait]
pub trait TemplateRegistry: Send + Sync {
    /// Resolve the latest deployed contract for `registry_id`.
    ///
    /// `Ok(None)` means the registry knows no version for that id, which is a
    /// different condition from a backend failure.
    async fn latest_contract(&self, registry_id: &str) -> Result<Option<Address>, RegistryError>;
}

/// Type alias for shared registry reference.
pub type SharedRegistry = Arc<dyn TemplateRegistry>;
