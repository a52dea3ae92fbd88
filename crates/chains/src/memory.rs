//! In-memory chain backend for tests and local development.
//!
//! [`MemoryChain`] plays the chain client: submissions consume scripted
//! per-method outcomes and replay the transaction lifecycle through the
//! regular notification channels, with deterministic sha2-derived hashes.
//! [`MemoryRegistry`] and [`MemoryNames`] play the registry and naming
//! collaborators over plain maps.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use common::{Address, CallValue};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::client::{ChainClient, ContractAbi, ContractHandle, SharedContract};
use crate::naming::{NameService, ResolveError, ResolveOptions};
use crate::registry::{RegistryError, TemplateRegistry};
use crate::tx::{CallOptions, PendingTx, TxFailure, TxLog, TxReceipt};

/// Scripted outcome for one submission of a contract method.
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    /// Confirm the transaction with these emitted logs.
    Confirm { logs: Vec<TxLog> },
    /// Fail the transaction. When `signed` is true the hash notification is
    /// delivered first and attached to the failure.
    Fail { message: String, signed: bool },
}

impl ScriptedOutcome {
    /// Confirmation emitting a single deploy log `event` with `field` set to
    /// `address`, the shape the deployment trackers expect.
    pub fn deploy(event: &str, field: &str, address: Address) -> Self {
        ScriptedOutcome::Confirm {
            logs: vec![TxLog::new(event, [(field, address.to_string())])],
        }
    }

    /// Failure after signing.
    pub fn fail(message: impl Into<String>) -> Self {
        ScriptedOutcome::Fail {
            message: message.into(),
            signed: true,
        }
    }

    /// Client-side rejection, before any hash exists.
    pub fn reject(message: impl Into<String>) -> Self {
        ScriptedOutcome::Fail {
            message: message.into(),
            signed: false,
        }
    }
}

type ScriptTable = Arc<Mutex<HashMap<String, VecDeque<ScriptedOutcome>>>>;

/// In-memory chain client with scripted transaction outcomes.
#[derive(Clone)]
pub struct MemoryChain {
    sender: Address,
    scripts: ScriptTable,
    seq: Arc<AtomicU64>,
}

impl MemoryChain {
    pub fn new(sender: Address) -> Self {
        Self {
            sender,
            scripts: Arc::new(Mutex::new(HashMap::new())),
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Queue the outcome for the next submission of `method`.
    ///
    /// Outcomes are consumed in FIFO order per method; a submission with no
    /// queued outcome fails its transaction.
    pub fn script(&self, method: &str, outcome: ScriptedOutcome) {
        self.scripts
            .lock()
            .expect("script table mutex poisoned")
            .entry(method.to_string())
            .or_default()
            .push_back(outcome);
    }
}

impl ChainClient for MemoryChain {
    fn sender(&self) -> Address {
        self.sender
    }

    fn bind_contract(&self, _abi: &ContractAbi, address: Address) -> SharedContract {
        debug!(contract = %address, "binding in-memory contract");
        Arc::new(MemoryContract {
            address,
            scripts: self.scripts.clone(),
            seq: self.seq.clone(),
        })
    }
}

struct MemoryContract {
    address: Address,
    scripts: ScriptTable,
    seq: Arc<AtomicU64>,
}

impl ContractHandle for MemoryContract {
    fn address(&self) -> Address {
        self.address
    }

    fn submit(&self, method: &str, args: &[CallValue], opts: &CallOptions) -> PendingTx {
        let (mut notifier, pending) = PendingTx::channel();

        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let tx_hash = derive_tx_hash(&self.address, method, args, seq);

        let outcome = self
            .scripts
            .lock()
            .expect("script table mutex poisoned")
            .get_mut(method)
            .and_then(VecDeque::pop_front);

        debug!(
            contract = %self.address,
            method,
            from = %opts.from,
            gas = opts.gas,
            tx_hash = %tx_hash,
            "submitting in-memory transaction"
        );

        let method = method.to_string();
        tokio::spawn(async move {
            // Yield once so the lifecycle is delivered asynchronously, like a
            // real broadcast would be.
            tokio::task::yield_now().await;

            match outcome {
                Some(ScriptedOutcome::Confirm { logs }) => {
                    notifier.hash_known(tx_hash.clone());
                    notifier.confirmed(TxReceipt { tx_hash, logs });
                }
                Some(ScriptedOutcome::Fail { message, signed }) => {
                    if signed {
                        notifier.hash_known(tx_hash.clone());
                        notifier.failed(TxFailure {
                            tx_hash: Some(tx_hash),
                            message,
                        });
                    } else {
                        notifier.failed(TxFailure {
                            tx_hash: None,
                            message,
                        });
                    }
                }
                None => {
                    warn!(method = %method, "no scripted outcome for method");
                    notifier.failed(TxFailure {
                        tx_hash: None,
                        message: format!("no scripted outcome for {method}"),
                    });
                }
            }
        });

        pending
    }
}

/// Derive a deterministic transaction hash for an in-memory submission.
fn derive_tx_hash(contract: &Address, method: &str, args: &[CallValue], seq: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"memchain-tx:");
    hasher.update(contract.as_bytes());
    hasher.update(b":");
    hasher.update(method.as_bytes());
    hasher.update(b":");
    for arg in args {
        hasher.update(arg.kind().as_bytes());
    }
    hasher.update(seq.to_le_bytes());
    let hash = hasher.finalize();
    format!("0x{}", hex::encode(hash))
}

/// In-memory template registry over a published id -> address map.
#[derive(Default)]
pub struct MemoryRegistry {
    entries: RwLock<HashMap<String, Address>>,
    outage: RwLock<Option<String>>,
    lookups: AtomicU64,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish (or replace) the deployed contract for a registry id.
    pub async fn publish(&self, registry_id: &str, address: Address) {
        self.entries
            .write()
            .await
            .insert(registry_id.to_string(), address);
    }

    /// Force every subsequent lookup to fail with a backend error.
    pub async fn set_outage(&self, message: impl Into<String>) {
        *self.outage.write().await = Some(message.into());
    }

    /// Number of lookups served so far.
    pub fn lookups(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl TemplateRegistry for MemoryRegistry {
    async fn latest_contract(&self, registry_id: &str) -> Result<Option<Address>, RegistryError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);

        if let Some(message) = self.outage.read().await.clone() {
            return Err(RegistryError::Backend(message));
        }

        Ok(self.entries.read().await.get(registry_id).copied())
    }
}

/// In-memory name service over a name -> address map.
///
/// A name absent from the map is "not registered"; a name mapped to
/// [`Address::ZERO`] is registered but unassigned.
#[derive(Default)]
pub struct MemoryNames {
    entries: RwLock<HashMap<String, Address>>,
    outage: RwLock<Option<String>>,
}

impl MemoryNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a name pointing at `address`.
    pub async fn register(&self, fqdn: &str, address: Address) {
        self.entries.write().await.insert(fqdn.to_string(), address);
    }

    /// Force every subsequent resolution to fail with a backend error.
    pub async fn set_outage(&self, message: impl Into<String>) {
        *self.outage.write().await = Some(message.into());
    }
}

#[async_trait]
impl NameService for MemoryNames {
    async fn resolve(&self, fqdn: &str, _opts: &ResolveOptions) -> Result<Address, ResolveError> {
        if let Some(message) = self.outage.read().await.clone() {
            return Err(ResolveError::Backend(message));
        }

        match self.entries.read().await.get(fqdn) {
            Some(address) => Ok(*address),
            None => Err(ResolveError::NotRegistered),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::TxOutcome;

    fn addr(n: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = n;
        Address::from_bytes(bytes)
    }

    fn abi() -> ContractAbi {
        ContractAbi::from_json(serde_json::json!([]))
    }

    #[tokio::test]
    async fn test_scripted_confirmation() {
        let chain = MemoryChain::new(addr(1));
        chain.script("newToken", ScriptedOutcome::deploy("DeployToken", "token", addr(9)));

        let contract = chain.bind_contract(&abi(), addr(2));
        let pending = contract.submit(
            "newToken",
            &[CallValue::from("Acme")],
            &CallOptions {
                from: addr(1),
                gas: 4_000_000,
            },
        );

        let tx_hash = pending.hash.await.unwrap();
        match pending.outcome.await.unwrap() {
            TxOutcome::Confirmed(receipt) => {
                assert_eq!(receipt.tx_hash, tx_hash);
                assert_eq!(
                    receipt.deployed_address("DeployToken", "token"),
                    Some(addr(9))
                );
            }
            other => panic!("expected confirmation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_scripted_failure_after_signing() {
        let chain = MemoryChain::new(addr(1));
        chain.script("newInstance", ScriptedOutcome::fail("out of gas"));

        let contract = chain.bind_contract(&abi(), addr(2));
        let pending = contract.submit(
            "newInstance",
            &[],
            &CallOptions {
                from: addr(1),
                gas: 6_900_000,
            },
        );

        match pending.outcome.await.unwrap() {
            TxOutcome::Failed(failure) => {
                assert!(failure.tx_hash.is_some());
                assert_eq!(failure.message, "out of gas");
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rejection_closes_hash_channel() {
        let chain = MemoryChain::new(addr(1));
        chain.script("newToken", ScriptedOutcome::reject("insufficient funds"));

        let contract = chain.bind_contract(&abi(), addr(2));
        let pending = contract.submit(
            "newToken",
            &[],
            &CallOptions {
                from: addr(1),
                gas: 4_000_000,
            },
        );

        let outcome = pending.outcome.await.unwrap();
        assert!(matches!(outcome, TxOutcome::Failed(ref f) if f.tx_hash.is_none()));
        assert!(pending.hash.await.is_err());
    }

    #[tokio::test]
    async fn test_unscripted_method_fails() {
        let chain = MemoryChain::new(addr(1));
        let contract = chain.bind_contract(&abi(), addr(2));
        let pending = contract.submit(
            "newToken",
            &[],
            &CallOptions {
                from: addr(1),
                gas: 4_000_000,
            },
        );

        match pending.outcome.await.unwrap() {
            TxOutcome::Failed(failure) => {
                assert!(failure.message.contains("no scripted outcome"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_tx_hashes_are_distinct_per_submission() {
        let chain = MemoryChain::new(addr(1));
        chain.script("newToken", ScriptedOutcome::deploy("DeployToken", "token", addr(9)));
        chain.script("newToken", ScriptedOutcome::deploy("DeployToken", "token", addr(9)));

        let contract = chain.bind_contract(&abi(), addr(2));
        let opts = CallOptions {
            from: addr(1),
            gas: 4_000_000,
        };
        let first = contract.submit("newToken", &[], &opts);
        let second = contract.submit("newToken", &[], &opts);

        let h1 = first.hash.await.unwrap();
        let h2 = second.hash.await.unwrap();
        assert_ne!(h1, h2);
    }

    #[tokio::test]
    async fn test_registry_lookup_and_miss() {
        let registry = MemoryRegistry::new();
        registry.publish("democracy-template.aragonpm.eth", addr(7)).await;

        let hit = registry
            .latest_contract("democracy-template.aragonpm.eth")
            .await
            .unwrap();
        assert_eq!(hit, Some(addr(7)));

        let miss = registry.latest_contract("unknown.aragonpm.eth").await.unwrap();
        assert_eq!(miss, None);
        assert_eq!(registry.lookups(), 2);
    }

    #[tokio::test]
    async fn test_registry_outage() {
        let registry = MemoryRegistry::new();
        registry.set_outage("gateway timeout").await;

        let err = registry.latest_contract("any").await.unwrap_err();
        assert!(matches!(err, RegistryError::Backend(ref m) if m == "gateway timeout"));
    }

    #[tokio::test]
    async fn test_name_resolution_paths() {
        let names = MemoryNames::new();
        names.register("acme.aragonid.eth", addr(5)).await;
        names.register("empty.aragonid.eth", Address::ZERO).await;

        let opts = ResolveOptions {
            endpoint: "mem://".to_string(),
            registry: addr(3),
        };

        assert_eq!(names.resolve("acme.aragonid.eth", &opts).await.unwrap(), addr(5));
        assert!(names
            .resolve("empty.aragonid.eth", &opts)
            .await
            .unwrap()
            .is_zero());
        assert!(matches!(
            names.resolve("ghost.aragonid.eth", &opts).await,
            Err(ResolveError::NotRegistered)
        ));
    }
}
