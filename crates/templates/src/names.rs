//! Organization name availability.
//!
//! Names are claimed under a fixed domain in the naming registry. A name
//! counts as free both when it resolves to the zero sentinel (registered but
//! unassigned) and when the naming system has never heard of it; the two
//! paths stay distinguishable internally for diagnostics, but callers get the
//! same `false`.

use chains::{NameService, ResolveError, ResolveOptions};
use tracing::debug;

/// Domain under which organization names are registered.
pub const ORG_NAME_DOMAIN: &str = "aragonid.eth";

/// Error type for name availability checks.
#[derive(Debug, thiserror::Error)]
pub enum NameCheckError {
    /// Resolution failed for a reason other than "never registered".
    #[error("could not resolve '{name}': {source}")]
    ResolutionFailed {
        /// The fully-qualified name that was attempted.
        name: String,
        #[source]
        source: ResolveError,
    },
}

/// Check whether `name` is already claimed.
///
/// `opts` is passed through to the resolver backend unchanged.
pub async fn is_name_used(
    naming: &dyn NameService,
    name: &str,
    opts: &ResolveOptions,
) -> Result<bool, NameCheckError> {
    let fqdn = format!("{name}.{ORG_NAME_DOMAIN}");

    match naming.resolve(&fqdn, opts).await {
        Ok(address) if address.is_zero() => {
            debug!(name = %fqdn, "name resolves to the zero address; free");
            Ok(false)
        }
        Ok(address) => {
            debug!(name = %fqdn, owner = %address, "name already claimed");
            Ok(true)
        }
        Err(ResolveError::NotRegistered) => {
            debug!(name = %fqdn, "name not registered; free");
            Ok(false)
        }
        Err(source) => Err(NameCheckError::ResolutionFailed { name: fqdn, source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chains::memory::MemoryNames;
    use common::Address;

    fn addr(n: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = n;
        Address::from_bytes(bytes)
    }

    fn opts() -> ResolveOptions {
        ResolveOptions {
            endpoint: "mem://".to_string(),
            registry: addr(1),
        }
    }

    #[tokio::test]
    async fn test_claimed_name() {
        let names = MemoryNames::new();
        names.register("acme.aragonid.eth", addr(7)).await;

        assert!(is_name_used(&names, "acme", &opts()).await.unwrap());
    }

    #[tokio::test]
    async fn test_zero_address_means_free() {
        let names = MemoryNames::new();
        names.register("acme.aragonid.eth", Address::ZERO).await;

        assert!(!is_name_used(&names, "acme", &opts()).await.unwrap());
    }

    #[tokio::test]
    async fn test_unregistered_name_means_free() {
        let names = MemoryNames::new();

        assert!(!is_name_used(&names, "acme", &opts()).await.unwrap());
    }

    #[tokio::test]
    async fn test_backend_failure_is_an_error_naming_the_fqdn() {
        let names = MemoryNames::new();
        names.set_outage("gateway timeout").await;

        let err = is_name_used(&names, "acme", &opts()).await.unwrap_err();
        let NameCheckError::ResolutionFailed { ref name, .. } = err;
        assert_eq!(name, "acme.aragonid.eth");
        assert!(err.to_string().contains("acme.aragonid.eth"));
        assert!(err.to_string().contains("gateway timeout"));
    }
}
