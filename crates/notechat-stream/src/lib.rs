//! Streaming core: wires the block scanner and message sender to a
//! ledger and a key-custody service, and exposes the three queues the
//! surrounding application consumes.
//!
//! Lifecycle is a one-way ladder:
//!
//! ```text
//! Uninitialized --init--> Initialized --run--> Running
//! ```
//!
//! `init` connects the clients, resolves the wallet, and allocates the
//! queues. `run` hands each task an owned context and spawns it; the
//! controller keeps no shared state with the running tasks -- the only
//! links are the queues and the shutdown signal. Both calls are
//! idempotent.

mod scanner;
mod sender;

#[cfg(test)]
mod mock;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use notechat_ledger::{Connect, KeyCustody, LedgerClient};
use notechat_types::config::StreamConfig;
use notechat_types::{ChatMessage, NotechatError, Result};

use crate::scanner::ScannerTask;
use crate::sender::SenderTask;

// ---------------------------------------------------------------------------
// StreamState
// ---------------------------------------------------------------------------

/// Where the controller is on the lifecycle ladder.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum StreamState {
    Uninitialized,
    Initialized,
    Running,
}

// ---------------------------------------------------------------------------
// ChatStream
// ---------------------------------------------------------------------------

/// Controller for one chat relay: a scanner task for inbound traffic
/// and a sender task for outbound traffic, joined by bounded queues.
pub struct ChatStream<L, K> {
    config: StreamConfig,
    state: StreamState,

    ledger: Option<Arc<L>>,
    custody: Option<Arc<K>>,
    wallet_id: Option<String>,

    // Queue ends the controller holds between init and run (task
    // ends) or until the caller claims them (consumer ends).
    inbound_tx: Option<mpsc::Sender<ChatMessage>>,
    inbound_rx: Option<mpsc::Receiver<ChatMessage>>,
    outbound_tx: Option<mpsc::Sender<String>>,
    outbound_rx: Option<mpsc::Receiver<String>>,
    status_tx: Option<mpsc::Sender<String>>,
    status_rx: Option<mpsc::Receiver<String>>,

    shutdown_tx: Option<watch::Sender<bool>>,
    tasks: Vec<JoinHandle<()>>,
}

impl<L, K> ChatStream<L, K>
where
    L: LedgerClient,
    K: KeyCustody,
{
    /// Creates a controller in the `Uninitialized` state.
    ///
    /// # Errors
    ///
    /// `NotechatError::ConfigError` if the configuration is invalid.
    pub fn new(config: StreamConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: StreamState::Uninitialized,
            ledger: None,
            custody: None,
            wallet_id: None,
            inbound_tx: None,
            inbound_rx: None,
            outbound_tx: None,
            outbound_rx: None,
            status_tx: None,
            status_rx: None,
            shutdown_tx: None,
            tasks: Vec::new(),
        })
    }

    /// Connects the configured ledger and custody endpoints, then
    /// initializes with those clients. Idempotent.
    pub async fn init(&mut self) -> Result<()>
    where
        L: Connect,
        K: Connect,
    {
        if self.state != StreamState::Uninitialized {
            return Ok(());
        }
        let ledger = L::connect(&self.config.ledger_url, &self.config.ledger_token)?;
        let custody = K::connect(&self.config.custody_url, &self.config.custody_token)?;
        self.init_with_clients(ledger, custody).await
    }

    /// Initializes with already-constructed clients: resolves the
    /// configured wallet name to its id and allocates the queues.
    /// Idempotent -- a second call changes nothing.
    ///
    /// # Errors
    ///
    /// `NotechatError::WalletError` if no wallet carries the
    /// configured name; custody listing failures propagate.
    pub async fn init_with_clients(&mut self, ledger: L, custody: K) -> Result<()> {
        if self.state != StreamState::Uninitialized {
            return Ok(());
        }

        let wallets = custody.list_wallets().await?;
        let wallet_id = wallets
            .into_iter()
            .find(|w| w.name == self.config.wallet_name)
            .map(|w| w.id)
            .ok_or_else(|| NotechatError::WalletError {
                reason: format!("no wallet named '{}'", self.config.wallet_name),
            })?;

        let (inbound_tx, inbound_rx) = mpsc::channel(self.config.inbound_capacity);
        let (outbound_tx, outbound_rx) = mpsc::channel(self.config.outbound_capacity);
        let (status_tx, status_rx) = mpsc::channel(self.config.status_capacity);
        let (shutdown_tx, _) = watch::channel(false);

        self.ledger = Some(Arc::new(ledger));
        self.custody = Some(Arc::new(custody));
        self.wallet_id = Some(wallet_id);
        self.inbound_tx = Some(inbound_tx);
        self.inbound_rx = Some(inbound_rx);
        self.outbound_tx = Some(outbound_tx);
        self.outbound_rx = Some(outbound_rx);
        self.status_tx = Some(status_tx);
        self.status_rx = Some(status_rx);
        self.shutdown_tx = Some(shutdown_tx);
        self.state = StreamState::Initialized;

        tracing::info!(wallet = %self.config.wallet_name, "stream initialized");
        Ok(())
    }

    /// Spawns the scanner and sender tasks. Idempotent once running.
    ///
    /// # Errors
    ///
    /// `NotechatError::ConfigError` if the stream was never
    /// initialized.
    pub fn run(&mut self) -> Result<()> {
        match self.state {
            StreamState::Running => return Ok(()),
            StreamState::Uninitialized => {
                return Err(NotechatError::ConfigError {
                    reason: "stream must be initialized before running".into(),
                });
            }
            StreamState::Initialized => {}
        }

        // Initialized implies every one of these is present.
        let (Some(ledger), Some(custody), Some(wallet_id)) = (
            self.ledger.clone(),
            self.custody.clone(),
            self.wallet_id.clone(),
        ) else {
            return Err(NotechatError::ConfigError {
                reason: "stream clients missing; initialization incomplete".into(),
            });
        };
        let (Some(inbound_tx), Some(outbound_rx), Some(status_tx)) = (
            self.inbound_tx.take(),
            self.outbound_rx.take(),
            self.status_tx.take(),
        ) else {
            return Err(NotechatError::ConfigError {
                reason: "stream queues missing; initialization incomplete".into(),
            });
        };
        let (scanner_shutdown, sender_shutdown) = match &self.shutdown_tx {
            Some(shutdown_tx) => (shutdown_tx.subscribe(), shutdown_tx.subscribe()),
            None => {
                return Err(NotechatError::ConfigError {
                    reason: "shutdown signal missing; initialization incomplete".into(),
                });
            }
        };

        let scanner = ScannerTask {
            ledger: Arc::clone(&ledger),
            chat_addr: self.config.chat_addr.clone(),
            lookback_rounds: self.config.lookback_rounds,
            inbound: inbound_tx,
            shutdown: scanner_shutdown,
        };
        let sender = SenderTask {
            ledger,
            custody,
            chat_addr: self.config.chat_addr.clone(),
            from_addr: self.config.from_addr.clone(),
            username: self.config.username.clone(),
            wallet_id,
            wallet_password: self.config.wallet_password.clone(),
            validity_rounds: self.config.validity_rounds,
            poll_interval: Duration::from_millis(self.config.poll_interval_ms),
            outbound: outbound_rx,
            status: status_tx,
            shutdown: sender_shutdown,
        };

        self.tasks.push(tokio::spawn(scanner::run_scanner(scanner)));
        self.tasks.push(tokio::spawn(sender::run_sender(sender)));
        self.state = StreamState::Running;

        tracing::info!("stream running");
        Ok(())
    }

    /// Claims the inbound queue receiver. Returns `None` before init
    /// or once already claimed.
    pub fn take_inbound(&mut self) -> Option<mpsc::Receiver<ChatMessage>> {
        self.inbound_rx.take()
    }

    /// Claims the status queue receiver. Returns `None` before init
    /// or once already claimed.
    pub fn take_status(&mut self) -> Option<mpsc::Receiver<String>> {
        self.status_rx.take()
    }

    /// Returns a sender for the outbound queue. `None` before init.
    pub fn outbound_sender(&self) -> Option<mpsc::Sender<String>> {
        self.outbound_tx.clone()
    }

    /// Signals shutdown and waits for both tasks to exit. Terminal:
    /// the stream cannot be restarted afterwards.
    pub async fn shutdown(&mut self) {
        if let Some(shutdown_tx) = &self.shutdown_tx {
            let _ = shutdown_tx.send(true);
        }
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                tracing::warn!(%e, "stream task exited abnormally");
            }
        }
        tracing::info!("stream stopped");
    }

    pub fn is_initialized(&self) -> bool {
        self.state != StreamState::Uninitialized
    }

    pub fn is_running(&self) -> bool {
        self.state == StreamState::Running
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
