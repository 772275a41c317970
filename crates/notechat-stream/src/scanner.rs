//! Block scanner: the inbound half of the relay.
//!
//! A forward-only cursor over ledger rounds. Each round is visited
//! exactly once, so inbound messages come out strictly in ascending
//! round order (and in transaction order within a round) with no
//! deduplication needed.
//!
//! Failure policy per step:
//!
//! - baseline round query: **fatal** -- without it the lookback cannot
//!   be bounded, the task exits.
//! - round wait: log and retry the same round.
//! - block fetch: skip the round, advance the cursor.
//! - payload decode: silently skip the transaction -- undecodable
//!   notes are indistinguishable from non-chat traffic.
//! - reputation lookup: substitute [`REPUTATION_UNKNOWN`].
//!
//! The inbound push is a blocking bounded send: a slow consumer
//! stalls the scan. That is the intended throttle, not a bug.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use notechat_ledger::LedgerClient;
use notechat_protocol::decode_payload;
use notechat_types::{ChatMessage, Round, ADDRESS_PREFIX_LEN, REPUTATION_UNKNOWN};

// ---------------------------------------------------------------------------
// ScannerTask
// ---------------------------------------------------------------------------

/// Owned context handed to the scanner loop at spawn time.
///
/// The loop never writes back into controller-owned state; all output
/// flows through the inbound queue.
pub(crate) struct ScannerTask<L> {
    pub ledger: Arc<L>,
    pub chat_addr: String,
    pub lookback_rounds: u64,
    pub inbound: mpsc::Sender<ChatMessage>,
    pub shutdown: watch::Receiver<bool>,
}

// ---------------------------------------------------------------------------
// Scanner loop
// ---------------------------------------------------------------------------

/// Runs the scan loop until shutdown is signalled.
pub(crate) async fn run_scanner<L: LedgerClient>(mut task: ScannerTask<L>) {
    // One-time baseline. No baseline means no bounded starting point,
    // so this failure aborts the scanning task entirely.
    let current = match task.ledger.current_round().await {
        Ok(round) => round,
        Err(e) => {
            tracing::error!(%e, "failed to query ledger status; scanner aborting");
            return;
        }
    };

    let mut cursor: Round = current.saturating_sub(task.lookback_rounds).max(1);
    tracing::info!(cursor, current, "scanner started");

    loop {
        if *task.shutdown.borrow() {
            break;
        }

        // Block until the round at the cursor is finalized.
        tokio::select! {
            result = task.ledger.wait_for_round(cursor) => {
                if let Err(e) = result {
                    tracing::warn!(%e, round = cursor, "round wait failed; retrying");
                    continue;
                }
            }
            result = task.shutdown.changed() => {
                if result.is_err() {
                    return;
                }
                continue;
            }
        }

        // An unfetchable round is skipped rather than retried forever.
        let block = match task.ledger.block(cursor).await {
            Ok(block) => block,
            Err(e) => {
                tracing::warn!(%e, round = cursor, "block fetch failed; skipping round");
                cursor += 1;
                continue;
            }
        };

        for txn in block.transactions {
            let payment = match &txn.payment {
                Some(payment) => payment,
                None => continue,
            };
            if payment.receiver != task.chat_addr {
                continue;
            }

            // Not decodable == not chat traffic. Not logged, not an error.
            let payload = match decode_payload(&txn.note) {
                Ok(payload) => payload,
                Err(_) => continue,
            };

            let reputation = match task.ledger.account(&txn.sender).await {
                Ok(info) => info.reputation.to_string(),
                Err(_) => REPUTATION_UNKNOWN.to_string(),
            };

            let message = ChatMessage {
                sender_prefix: txn.sender.chars().take(ADDRESS_PREFIX_LEN).collect(),
                reputation,
                round: cursor.to_string(),
                username: payload.username,
                text: payload.message,
            };

            // Blocking push: a full queue stalls the scan on purpose.
            tokio::select! {
                result = task.inbound.send(message) => {
                    if result.is_err() {
                        // Consumer dropped the receiver; nothing left to do.
                        return;
                    }
                }
                result = task.shutdown.changed() => {
                    if result.is_err() || *task.shutdown.borrow() {
                        return;
                    }
                }
            }
        }

        cursor += 1;
    }

    tracing::info!("scanner stopped");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
