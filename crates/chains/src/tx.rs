//! Transaction lifecycle plumbing.
//!
//! A submitted transaction reports at most three things, in order: its hash
//! once it has been signed and broadcast, then exactly one of a confirmation
//! receipt (with emitted logs) or a failure. [`PendingTx::channel`] builds the
//! paired halves: the backend drives a [`TxNotifier`], the consumer awaits the
//! receivers on [`PendingTx`].

use std::collections::HashMap;

use common::Address;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// Per-call submission options.
///
/// `from` is the signing account, shared read-only configuration across all
/// transactions of one deployment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CallOptions {
    pub from: Address,
    /// Gas limit for the call.
    pub gas: u64,
}

/// A log emitted by a confirmed transaction.
///
/// Log values are carried as strings; typed extraction (e.g. an address)
/// happens at the consumer, which knows which log it expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxLog {
    /// Name of the emitted event.
    pub event: String,
    /// Named return values of the event.
    pub values: HashMap<String, String>,
}

impl TxLog {
    /// Build a log from an event name and `(name, value)` pairs.
    pub fn new<I, K, V>(event: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            event: event.into(),
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Look up a named value in this log.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// Receipt for a confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: String,
    /// Logs emitted during execution, in emission order.
    pub logs: Vec<TxLog>,
}

impl TxReceipt {
    /// Find the first log emitted for `event`.
    pub fn log(&self, event: &str) -> Option<&TxLog> {
        self.logs.iter().find(|l| l.event == event)
    }

    /// Extract an address value from the first `event` log's `field`.
    ///
    /// Returns `None` when the log or field is absent, or the value does not
    /// parse as an address.
    pub fn deployed_address(&self, event: &str, field: &str) -> Option<Address> {
        let raw = self.log(event)?.value(field)?;
        Address::parse(raw).ok()
    }
}

/// A failed transaction.
///
/// The hash is attached when the failure happened after signing; a client-side
/// rejection may fail before any hash exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxFailure {
    pub tx_hash: Option<String>,
    pub message: String,
}

/// Terminal outcome of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxOutcome {
    Confirmed(TxReceipt),
    Failed(TxFailure),
}

/// The consumer half of a submitted transaction.
///
/// Within one transaction, a hash notification (if any) always precedes the
/// outcome. Both channels are one-shot; the lifecycle is not restartable.
#[derive(Debug)]
pub struct PendingTx {
    /// Resolves once the transaction hash is known (signed and broadcast).
    pub hash: oneshot::Receiver<String>,
    /// Resolves exactly once with the terminal outcome.
    pub outcome: oneshot::Receiver<TxOutcome>,
}

impl PendingTx {
    /// Create the paired notifier/pending halves for one transaction.
    pub fn channel() -> (TxNotifier, PendingTx) {
        let (hash_tx, hash_rx) = oneshot::channel();
        let (outcome_tx, outcome_rx) = oneshot::channel();
        (
            TxNotifier {
                hash: Some(hash_tx),
                outcome: Some(outcome_tx),
            },
            PendingTx {
                hash: hash_rx,
                outcome: outcome_rx,
            },
        )
    }
}

/// The backend half of a submitted transaction.
///
/// Backends call [`TxNotifier::hash_known`] at most once, then exactly one of
/// [`TxNotifier::confirmed`] or [`TxNotifier::failed`].
#[derive(Debug)]
pub struct TxNotifier {
    hash: Option<oneshot::Sender<String>>,
    outcome: Option<oneshot::Sender<TxOutcome>>,
}

impl TxNotifier {
    /// Report the transaction hash. Subsequent calls are no-ops.
    pub fn hash_known(&mut self, tx_hash: impl Into<String>) {
        if let Some(sender) = self.hash.take() {
            // The consumer may already be gone; the broadcast happened anyway.
            let _ = sender.send(tx_hash.into());
        }
    }

    /// Report confirmation with the emitted logs. Consumes the notifier.
    pub fn confirmed(mut self, receipt: TxReceipt) {
        if let Some(sender) = self.outcome.take() {
            let _ = sender.send(TxOutcome::Confirmed(receipt));
        }
    }

    /// Report failure. Consumes the notifier.
    pub fn failed(mut self, failure: TxFailure) {
        if let Some(sender) = self.outcome.take() {
            let _ = sender.send(TxOutcome::Failed(failure));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_then_confirmation() {
        let (mut notifier, pending) = PendingTx::channel();

        notifier.hash_known("0xabc");
        notifier.confirmed(TxReceipt {
            tx_hash: "0xabc".to_string(),
            logs: vec![],
        });

        assert_eq!(pending.hash.await.unwrap(), "0xabc");
        match pending.outcome.await.unwrap() {
            TxOutcome::Confirmed(receipt) => assert_eq!(receipt.tx_hash, "0xabc"),
            other => panic!("expected confirmation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failure_without_hash() {
        let (notifier, pending) = PendingTx::channel();

        notifier.failed(TxFailure {
            tx_hash: None,
            message: "rejected by client".to_string(),
        });

        // Hash channel closes without a value.
        assert!(pending.hash.await.is_err());
        match pending.outcome.await.unwrap() {
            TxOutcome::Failed(failure) => {
                assert!(failure.tx_hash.is_none());
                assert_eq!(failure.message, "rejected by client");
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_deployed_address_extraction() {
        let receipt = TxReceipt {
            tx_hash: "0x1".to_string(),
            logs: vec![
                TxLog::new("Transfer", [("to", "0xfeed")]),
                TxLog::new(
                    "DeployToken",
                    [("token", "0x00112233445566778899aabbccddeeff00112233")],
                ),
            ],
        };

        let addr = receipt.deployed_address("DeployToken", "token").unwrap();
        assert_eq!(
            addr.to_string(),
            "0x00112233445566778899aabbccddeeff00112233"
        );

        assert!(receipt.deployed_address("DeployInstance", "dao").is_none());
        // Present log, absent field.
        assert!(receipt.deployed_address("DeployToken", "dao").is_none());
        // Present field, unparseable value.
        assert!(receipt.deployed_address("Transfer", "to").is_none());
    }
}
