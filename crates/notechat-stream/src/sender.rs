//! Message sender: the outbound half of the relay.
//!
//! Consumes one outgoing text item at a time -- sends are strictly
//! serialized, there is never more than one transaction in flight.
//! Per item: suggested params → encode payload → build zero-amount
//! payment → wallet handle → sign → submit → poll confirmation.
//!
//! A failure at any step abandons only the current item; the loop
//! then continues with the next one. Progress and terminal outcomes
//! are reported on the status queue.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use notechat_ledger::{KeyCustody, LedgerClient, UnsignedTxn};
use notechat_protocol::{encode_payload, ChatPayload};
use notechat_types::Result;

// ---------------------------------------------------------------------------
// SenderTask
// ---------------------------------------------------------------------------

/// Owned context handed to the sender loop at spawn time.
pub(crate) struct SenderTask<L, K> {
    pub ledger: Arc<L>,
    pub custody: Arc<K>,
    pub chat_addr: String,
    pub from_addr: String,
    pub username: String,
    pub wallet_id: String,
    pub wallet_password: String,
    pub validity_rounds: u64,
    pub poll_interval: Duration,
    pub outbound: mpsc::Receiver<String>,
    pub status: mpsc::Sender<String>,
    pub shutdown: watch::Receiver<bool>,
}

// ---------------------------------------------------------------------------
// Sender loop
// ---------------------------------------------------------------------------

/// Runs the send loop until shutdown is signalled or the outbound
/// queue closes.
pub(crate) async fn run_sender<L, K>(mut task: SenderTask<L, K>)
where
    L: LedgerClient,
    K: KeyCustody,
{
    loop {
        let text = tokio::select! {
            item = task.outbound.recv() => match item {
                Some(text) => text,
                None => return,
            },
            result = task.shutdown.changed() => {
                if result.is_err() || *task.shutdown.borrow() {
                    return;
                }
                continue;
            }
        };

        if let Err(e) = submit_one(&mut task, &text).await {
            tracing::warn!(%e, "message send abandoned");
            let _ = task.status.send(format!("Error!: {e}")).await;
        }
    }
}

/// Carries one text item to a terminal state.
///
/// Returns `Err` only for failures before a terminal status was
/// emitted; submission and confirmation outcomes report their own
/// terminal status and resolve to `Ok`.
async fn submit_one<L, K>(task: &mut SenderTask<L, K>, text: &str) -> Result<()>
where
    L: LedgerClient,
    K: KeyCustody,
{
    let params = task.ledger.suggested_params().await?;

    let note = encode_payload(&ChatPayload::new(task.username.clone(), text))?;

    let txn = UnsignedTxn::payment(
        &task.from_addr,
        &task.chat_addr,
        0, // the message is the payload, not a value transfer
        note,
        &params,
        task.validity_rounds,
    )?;

    let handle = task
        .custody
        .init_wallet_handle(&task.wallet_id, &task.wallet_password)
        .await?;
    let signed = task
        .custody
        .sign_transaction(&handle, &task.wallet_password, &txn)
        .await?;

    let _ = task
        .status
        .send(format!("Sending with fee {}...", txn.fee))
        .await;

    let tx_id = match task.ledger.submit(&signed).await {
        Ok(tx_id) => tx_id,
        Err(e) => {
            tracing::warn!(%e, "transaction submission failed");
            let _ = task
                .status
                .send("Failed to send the message!".to_string())
                .await;
            return Ok(());
        }
    };

    let _ = task
        .status
        .send("Waiting for confirmation...".to_string())
        .await;

    wait_for_confirmation(task, &tx_id).await;
    Ok(())
}

/// Polls the pending status of `tx_id` until it resolves.
///
/// Terminates on the first response with `confirmed_round > 0`
/// (success) or a non-empty pool error (reported verbatim). Shutdown
/// is observed between polls; there is no other timeout.
async fn wait_for_confirmation<L, K>(task: &mut SenderTask<L, K>, tx_id: &str)
where
    L: LedgerClient,
    K: KeyCustody,
{
    loop {
        tokio::select! {
            _ = tokio::time::sleep(task.poll_interval) => {}
            result = task.shutdown.changed() => {
                if result.is_err() || *task.shutdown.borrow() {
                    return;
                }
                continue;
            }
        }

        let pending = match task.ledger.pending_status(tx_id).await {
            Ok(pending) => pending,
            Err(e) => {
                tracing::warn!(%e, tx_id, "pending status query failed");
                let _ = task
                    .status
                    .send("Error!: Error querying pending transaction!".to_string())
                    .await;
                return;
            }
        };

        if pending.confirmed_round > 0 {
            let _ = task
                .status
                .send("Done, will appear soon!".to_string())
                .await;
            return;
        }

        if !pending.pool_error.is_empty() {
            let _ = task
                .status
                .send(format!("Error!: {}", pending.pool_error))
                .await;
            return;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use notechat_ledger::{PendingStatus, SuggestedParams};
    use notechat_protocol::decode_payload;

    use super::*;
    use crate::mock::{CustodyState, LedgerState, MockCustody, MockLedger};

    const CHAT: &str = "CHATADDRESS";
    const FROM: &str = "FROMADDRESS";

    fn params() -> SuggestedParams {
        SuggestedParams {
            fee: 1000,
            last_round: 5000,
            genesis_id: "testnet-v1.0".into(),
            genesis_hash: "abcd".into(),
        }
    }

    fn confirmed(round: u64) -> PendingStatus {
        PendingStatus {
            confirmed_round: round,
            pool_error: String::new(),
        }
    }

    fn spawn_sender(
        ledger: &MockLedger,
        custody: &MockCustody,
    ) -> (
        mpsc::Sender<String>,
        mpsc::Receiver<String>,
        watch::Sender<bool>,
        tokio::task::JoinHandle<()>,
    ) {
        let (outbound_tx, outbound_rx) = mpsc::channel(10);
        let (status_tx, status_rx) = mpsc::channel(32);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = SenderTask {
            ledger: Arc::new(ledger.clone()),
            custody: Arc::new(custody.clone()),
            chat_addr: CHAT.into(),
            from_addr: FROM.into(),
            username: "alice".into(),
            wallet_id: "wallet-1".into(),
            wallet_password: "secret".into(),
            validity_rounds: 100,
            poll_interval: Duration::from_millis(5),
            outbound: outbound_rx,
            status: status_tx,
            shutdown: shutdown_rx,
        };
        let handle = tokio::spawn(run_sender(task));
        (outbound_tx, status_rx, shutdown_tx, handle)
    }

    async fn next_status(status: &mut mpsc::Receiver<String>) -> String {
        timeout(Duration::from_secs(5), status.recv())
            .await
            .expect("no status update")
            .expect("status channel closed")
    }

    #[tokio::test]
    async fn successful_send_reports_full_status_sequence() {
        let ledger = MockLedger::new(LedgerState {
            params: Some(params()),
            ..LedgerState::default()
        });
        ledger.set_pending("TX1", vec![PendingStatus::default(), confirmed(5003)]);
        let custody = MockCustody::new(CustodyState::default());

        let (outbound, mut status, _shutdown, _handle) = spawn_sender(&ledger, &custody);
        outbound.send("hello".into()).await.expect("queue send");

        assert_eq!(next_status(&mut status).await, "Sending with fee 1000...");
        assert_eq!(next_status(&mut status).await, "Waiting for confirmation...");
        assert_eq!(next_status(&mut status).await, "Done, will appear soon!");

        // The signed transaction carried the message as a zero-amount
        // payment to the chat address, valid over the window.
        let signed = custody.signed();
        assert_eq!(signed.len(), 1);
        let txn = &signed[0];
        assert_eq!(txn.receiver, CHAT);
        assert_eq!(txn.sender, FROM);
        assert_eq!(txn.amount, 0);
        assert_eq!(txn.first_valid, 5000);
        assert_eq!(txn.last_valid, 5100);
        let payload = decode_payload(&txn.note).expect("note decodes");
        assert_eq!(payload.username, "alice");
        assert_eq!(payload.message, "hello");
    }

    #[tokio::test]
    async fn sends_are_strictly_serialized() {
        let ledger = MockLedger::new(LedgerState {
            params: Some(params()),
            ..LedgerState::default()
        });
        ledger.set_pending("TX1", vec![confirmed(5001)]);
        ledger.set_pending("TX2", vec![confirmed(5002)]);
        let custody = MockCustody::new(CustodyState::default());

        let (outbound, mut status, _shutdown, _handle) = spawn_sender(&ledger, &custody);
        // Both queued before either resolves.
        outbound.send("first".into()).await.expect("queue send");
        outbound.send("second".into()).await.expect("queue send");

        // Two full status sequences.
        for _ in 0..6 {
            next_status(&mut status).await;
        }

        // T1 reached its terminal poll before T2's params were even
        // fetched.
        let calls = ledger.calls();
        let t1_poll = calls
            .iter()
            .position(|c| c == "pending:TX1")
            .expect("TX1 was polled");
        let t2_params = calls
            .iter()
            .rposition(|c| c == "params")
            .expect("params fetched");
        assert!(
            t1_poll < t2_params,
            "second build started before first resolved: {calls:?}"
        );
    }

    #[tokio::test]
    async fn pool_rejection_reports_exact_error_text() {
        let ledger = MockLedger::new(LedgerState {
            params: Some(params()),
            ..LedgerState::default()
        });
        ledger.set_pending(
            "TX1",
            vec![PendingStatus {
                confirmed_round: 0,
                pool_error: "overspend: account has no funds".into(),
            }],
        );
        let custody = MockCustody::new(CustodyState::default());

        let (outbound, mut status, _shutdown, _handle) = spawn_sender(&ledger, &custody);
        outbound.send("doomed".into()).await.expect("queue send");

        assert_eq!(next_status(&mut status).await, "Sending with fee 1000...");
        assert_eq!(next_status(&mut status).await, "Waiting for confirmation...");
        assert_eq!(
            next_status(&mut status).await,
            "Error!: overspend: account has no funds"
        );
    }

    #[tokio::test]
    async fn params_failure_abandons_item_but_not_loop() {
        let ledger = MockLedger::new(LedgerState {
            params: Some(params()),
            params_failures: 1,
            ..LedgerState::default()
        });
        ledger.set_pending("TX1", vec![confirmed(5001)]);
        let custody = MockCustody::new(CustodyState::default());

        let (outbound, mut status, _shutdown, _handle) = spawn_sender(&ledger, &custody);
        outbound.send("dropped".into()).await.expect("queue send");
        outbound.send("delivered".into()).await.expect("queue send");

        // First item fails at step one and is abandoned.
        let first = next_status(&mut status).await;
        assert!(first.starts_with("Error!:"), "unexpected status: {first}");

        // Second item goes through untouched.
        assert_eq!(next_status(&mut status).await, "Sending with fee 1000...");
        assert_eq!(next_status(&mut status).await, "Waiting for confirmation...");
        assert_eq!(next_status(&mut status).await, "Done, will appear soon!");
        assert_eq!(custody.signed().len(), 1);
    }

    #[tokio::test]
    async fn submission_failure_is_terminal_for_the_item() {
        let ledger = MockLedger::new(LedgerState {
            params: Some(params()),
            submit_fail: true,
            ..LedgerState::default()
        });
        let custody = MockCustody::new(CustodyState::default());

        let (outbound, mut status, _shutdown, _handle) = spawn_sender(&ledger, &custody);
        outbound.send("hello".into()).await.expect("queue send");

        assert_eq!(next_status(&mut status).await, "Sending with fee 1000...");
        assert_eq!(next_status(&mut status).await, "Failed to send the message!");

        // No confirmation polling happened.
        assert!(!ledger.calls().iter().any(|c| c.starts_with("pending:")));
    }

    #[tokio::test]
    async fn pending_query_failure_reports_and_moves_on() {
        let ledger = MockLedger::new(LedgerState {
            params: Some(params()),
            pending_fail: true,
            ..LedgerState::default()
        });
        let custody = MockCustody::new(CustodyState::default());

        let (outbound, mut status, _shutdown, _handle) = spawn_sender(&ledger, &custody);
        outbound.send("hello".into()).await.expect("queue send");

        assert_eq!(next_status(&mut status).await, "Sending with fee 1000...");
        assert_eq!(next_status(&mut status).await, "Waiting for confirmation...");
        assert_eq!(
            next_status(&mut status).await,
            "Error!: Error querying pending transaction!"
        );
    }

    #[tokio::test]
    async fn handle_failure_prevents_submission() {
        let ledger = MockLedger::new(LedgerState {
            params: Some(params()),
            ..LedgerState::default()
        });
        let custody = MockCustody::new(CustodyState {
            handle_fail: true,
            ..CustodyState::default()
        });

        let (outbound, mut status, _shutdown, _handle) = spawn_sender(&ledger, &custody);
        outbound.send("hello".into()).await.expect("queue send");

        let report = next_status(&mut status).await;
        assert!(report.starts_with("Error!:"), "unexpected status: {report}");
        assert!(!ledger.calls().contains(&"submit".to_string()));
    }

    #[tokio::test]
    async fn shutdown_exits_idle_sender() {
        let ledger = MockLedger::new(LedgerState::default());
        let custody = MockCustody::new(CustodyState::default());

        let (_outbound, _status, shutdown, handle) = spawn_sender(&ledger, &custody);
        shutdown.send(true).expect("signal shutdown");

        timeout(Duration::from_secs(5), handle)
            .await
            .expect("sender ignored shutdown")
            .expect("sender panicked");
    }

    #[tokio::test]
    async fn shutdown_exits_confirmation_poll() {
        // Pending status never resolves: the poll would spin forever.
        let ledger = MockLedger::new(LedgerState {
            params: Some(params()),
            ..LedgerState::default()
        });
        ledger.set_pending("TX1", vec![PendingStatus::default()]);
        let custody = MockCustody::new(CustodyState::default());

        let (outbound, mut status, shutdown, handle) = spawn_sender(&ledger, &custody);
        outbound.send("stuck".into()).await.expect("queue send");

        assert_eq!(next_status(&mut status).await, "Sending with fee 1000...");
        assert_eq!(next_status(&mut status).await, "Waiting for confirmation...");

        shutdown.send(true).expect("signal shutdown");
        timeout(Duration::from_secs(5), handle)
            .await
            .expect("sender ignored shutdown")
            .expect("sender panicked");
    }
}
