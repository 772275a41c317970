//! Data carried across the collaborator seams.
//!
//! These double as the REST wire DTOs in `notechat-client`, so they
//! all derive serde. Note bytes travel hex-encoded in JSON bodies.

use serde::{Deserialize, Serialize};

use notechat_types::Round;

// ---------------------------------------------------------------------------
// Block / Transaction
// ---------------------------------------------------------------------------

/// A finalized block: the transactions it contains, in block order.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Transactions in the order the block finalized them.
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// One ledger transaction, reduced to the fields the relay inspects.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Full address of the sending account.
    pub sender: String,

    /// Opaque note bytes attached to the transaction.
    #[serde(default, with = "hex::serde")]
    pub note: Vec<u8>,

    /// Payment fields, present only for payment transactions.
    #[serde(default)]
    pub payment: Option<Payment>,
}

/// Payment-specific transaction fields.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Address of the receiving account.
    pub receiver: String,
    /// Transferred amount in base units. Zero for chat traffic.
    pub amount: u64,
}

// ---------------------------------------------------------------------------
// AccountInfo
// ---------------------------------------------------------------------------

/// Account metadata the relay cares about.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Trust/standing value associated with the account.
    pub reputation: u64,
}

// ---------------------------------------------------------------------------
// SuggestedParams
// ---------------------------------------------------------------------------

/// Parameters a new transaction should be built with.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SuggestedParams {
    /// Suggested fee, in base units.
    pub fee: u64,
    /// Most recently finalized round.
    pub last_round: Round,
    /// Genesis identifier of the network.
    pub genesis_id: String,
    /// Genesis hash of the network, hex-encoded.
    pub genesis_hash: String,
}

// ---------------------------------------------------------------------------
// PendingStatus
// ---------------------------------------------------------------------------

/// Status of a submitted transaction that may not be finalized yet.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PendingStatus {
    /// Round the transaction was confirmed in; zero while pending.
    #[serde(default)]
    pub confirmed_round: Round,

    /// Non-empty once the transaction pool rejected the transaction.
    #[serde(default)]
    pub pool_error: String,
}

// ---------------------------------------------------------------------------
// WalletInfo
// ---------------------------------------------------------------------------

/// One wallet entry as listed by the custody service.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct WalletInfo {
    /// Opaque wallet identifier used for handle acquisition.
    pub id: String,
    /// Human-chosen wallet name used for lookup.
    pub name: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
