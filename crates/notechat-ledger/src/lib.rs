//! Collaborator seams consumed by the stream core.
//!
//! The core never talks HTTP itself. It goes through two traits:
//! [`LedgerClient`] for the ledger node (block/account/parameter
//! queries, submission) and [`KeyCustody`] for the wallet service
//! (wallet lookup, handle acquisition, signing). The core never
//! touches raw private key material.
//!
//! Concrete REST implementations live in `notechat-client`; tests
//! substitute in-memory mocks.

pub mod txn;
pub mod types;

use async_trait::async_trait;

use notechat_types::{Result, Round};

pub use txn::UnsignedTxn;
pub use types::{AccountInfo, Block, Payment, PendingStatus, SuggestedParams, Transaction, WalletInfo};

// ---------------------------------------------------------------------------
// Connect
// ---------------------------------------------------------------------------

/// Constructs a client from an endpoint URL and API token.
///
/// Separate from the query traits so the stream controller can build
/// clients during `init` while staying generic over their concrete
/// type.
pub trait Connect: Sized {
    /// Creates a client for the service at `url`, authenticating with
    /// `token`. Fails if the endpoint address is unusable.
    fn connect(url: &str, token: &str) -> Result<Self>;
}

// ---------------------------------------------------------------------------
// LedgerClient
// ---------------------------------------------------------------------------

/// Read/write access to the ledger node.
#[async_trait]
pub trait LedgerClient: Send + Sync + 'static {
    /// Returns the most recently finalized round.
    async fn current_round(&self) -> Result<Round>;

    /// Blocks until the given round is finalized, returning the round
    /// the ledger had reached when the wait resolved.
    async fn wait_for_round(&self, round: Round) -> Result<Round>;

    /// Fetches the block finalized at `round`.
    async fn block(&self, round: Round) -> Result<Block>;

    /// Looks up account metadata for `address`.
    async fn account(&self, address: &str) -> Result<AccountInfo>;

    /// Fetches the parameters a new transaction should be built with.
    async fn suggested_params(&self) -> Result<SuggestedParams>;

    /// Submits signed transaction bytes, returning the submission id.
    async fn submit(&self, signed: &[u8]) -> Result<String>;

    /// Queries the pending status of a submitted transaction.
    async fn pending_status(&self, tx_id: &str) -> Result<PendingStatus>;
}

// ---------------------------------------------------------------------------
// KeyCustody
// ---------------------------------------------------------------------------

/// Access to the key-custody service that holds the wallets.
#[async_trait]
pub trait KeyCustody: Send + Sync + 'static {
    /// Lists all wallets known to the custody service.
    async fn list_wallets(&self) -> Result<Vec<WalletInfo>>;

    /// Opens a wallet handle, returning the temporary handle token
    /// required for signing.
    async fn init_wallet_handle(&self, wallet_id: &str, password: &str) -> Result<String>;

    /// Signs an unsigned transaction through an open wallet handle,
    /// returning the signed transaction bytes.
    async fn sign_transaction(
        &self,
        handle: &str,
        password: &str,
        txn: &UnsignedTxn,
    ) -> Result<Vec<u8>>;
}
