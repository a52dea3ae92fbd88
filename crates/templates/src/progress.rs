//! Progress events reported to the deployment subscriber.
//!
//! Each transaction kind emits `SIGNED` at most once, then exactly one of
//! `MINED` or `ERROR`, after which it emits nothing further. Events serialize
//! in the `{transaction, status, meta}` shape the host UI renders.

use common::Address;
use serde::{Deserialize, Serialize};

/// Which of the two deployment transactions an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxKind {
    /// Governance token creation.
    Token,
    /// Organization instantiation.
    Organization,
}

impl TxKind {
    /// The `(event, field)` of the log a confirmed receipt is expected to
    /// carry the deployed address in.
    pub fn deploy_log(&self) -> (&'static str, &'static str) {
        match self {
            TxKind::Token => ("DeployToken", "token"),
            TxKind::Organization => ("DeployInstance", "dao"),
        }
    }
}

impl std::fmt::Display for TxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TxKind::Token => write!(f, "TOKEN"),
            TxKind::Organization => write!(f, "ORGANIZATION"),
        }
    }
}

/// Lifecycle step an event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxStatus {
    /// Signed and broadcast; the hash is known.
    Signed,
    /// Confirmed; the deployed address is known.
    Mined,
    /// Failed on-chain or client-side.
    Error,
}

/// Event metadata; which fields are set depends on the status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressMeta {
    /// Transaction hash; absent only for failures before signing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    /// Deployed token/organization address (MINED only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    /// Failure description (ERROR only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// One unit of deployment progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    #[serde(rename = "transaction")]
    pub kind: TxKind,
    pub status: TxStatus,
    pub meta: ProgressMeta,
}

impl ProgressEvent {
    pub fn signed(kind: TxKind, tx_hash: impl Into<String>) -> Self {
        Self {
            kind,
            status: TxStatus::Signed,
            meta: ProgressMeta {
                tx_hash: Some(tx_hash.into()),
                ..Default::default()
            },
        }
    }

    pub fn mined(kind: TxKind, tx_hash: impl Into<String>, address: Address) -> Self {
        Self {
            kind,
            status: TxStatus::Mined,
            meta: ProgressMeta {
                tx_hash: Some(tx_hash.into()),
                address: Some(address),
                ..Default::default()
            },
        }
    }

    pub fn error(kind: TxKind, tx_hash: Option<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: TxStatus::Error,
            meta: ProgressMeta {
                tx_hash,
                message: Some(message.into()),
                ..Default::default()
            },
        }
    }

    /// Whether this event ends its kind's sequence.
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, TxStatus::Mined | TxStatus::Error)
    }
}
