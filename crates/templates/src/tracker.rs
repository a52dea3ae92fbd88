//! Transaction progress tracker.
//!
//! Drives one submitted transaction's notification channels into a finite
//! event sequence on the shared fan-in channel: `SIGNED` when the hash becomes
//! known, then exactly one terminal `MINED` or `ERROR`. The tracker never
//! propagates a failure out-of-band; everything the underlying transaction
//! reports becomes an in-band event, and the fan-in leg closes (the sender
//! drops) when the sequence is complete.

use chains::{PendingTx, TxOutcome};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::orchestrator::ProgressItem;
use crate::progress::{ProgressEvent, TxKind};

/// Spawn the tracking task for one transaction.
pub(crate) fn spawn(
    kind: TxKind,
    pending: PendingTx,
    events: mpsc::Sender<ProgressItem>,
) -> JoinHandle<()> {
    tokio::spawn(drive(kind, pending, events))
}

async fn drive(kind: TxKind, pending: PendingTx, events: mpsc::Sender<ProgressItem>) {
    let PendingTx {
        mut hash,
        mut outcome,
    } = pending;

    let mut signed_hash: Option<String> = None;

    // `biased` so that a hash already delivered is always reported before a
    // simultaneously-ready outcome, keeping SIGNED ahead of the terminal event.
    let result = tokio::select! {
        biased;

        res = &mut hash => {
            if let Ok(tx_hash) = res {
                debug!(kind = %kind, tx_hash = %tx_hash, "transaction signed");
                signed_hash = Some(tx_hash.clone());
                if events
                    .send(Ok(ProgressEvent::signed(kind, tx_hash)))
                    .await
                    .is_err()
                {
                    // Subscriber went away; the transaction is already
                    // broadcast and cannot be retracted, so just stop
                    // delivering.
                    return;
                }
            }
            (&mut outcome).await
        }

        res = &mut outcome => res,
    };

    let terminal = match result {
        Ok(TxOutcome::Confirmed(receipt)) => {
            let (event, field) = kind.deploy_log();
            match receipt.deployed_address(event, field) {
                Some(address) => {
                    debug!(kind = %kind, tx_hash = %receipt.tx_hash, address = %address, "transaction mined");
                    ProgressEvent::mined(kind, receipt.tx_hash, address)
                }
                None => {
                    // The template contract guarantees this log; its absence
                    // is a broken receipt, reported in-band so the stream
                    // grammar stays intact.
                    warn!(kind = %kind, tx_hash = %receipt.tx_hash, "confirmed receipt missing {event} log");
                    ProgressEvent::error(
                        kind,
                        Some(receipt.tx_hash),
                        format!("transaction confirmed without expected {event} log"),
                    )
                }
            }
        }
        Ok(TxOutcome::Failed(failure)) => {
            warn!(kind = %kind, message = %failure.message, "transaction failed");
            ProgressEvent::error(kind, failure.tx_hash.or(signed_hash), failure.message)
        }
        Err(_) => {
            warn!(kind = %kind, "transaction handle dropped before a terminal notification");
            ProgressEvent::error(
                kind,
                signed_hash,
                "transaction handle dropped before a terminal notification",
            )
        }
    };

    let _ = events.send(Ok(terminal)).await;
}
