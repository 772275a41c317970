//! Core shared types for the Notechat ledger chat relay.
//!
//! This crate defines the types used across the workspace. No other
//! crate should define shared types -- everything lives here.

pub mod config;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of leading characters of the sender's ledger address shown
/// next to an inbound message. The full address is never exposed to
/// the consumer.
pub const ADDRESS_PREFIX_LEN: usize = 5;

/// Sentinel reputation string used when the sender's account lookup
/// fails. Consumers display it verbatim.
pub const REPUTATION_UNKNOWN: &str = "N/A";

// ---------------------------------------------------------------------------
// Round
// ---------------------------------------------------------------------------

/// A unit of finalized progress in the ledger (block height).
pub type Round = u64;

// ---------------------------------------------------------------------------
// ChatMessage
// ---------------------------------------------------------------------------

/// A fully enriched inbound chat message, ready for display.
///
/// Constructed by the block scanner only from a transaction note that
/// successfully decoded as a chat payload. The `sender_prefix`,
/// `reputation`, and `round` fields are receiver-side enrichment and
/// never travel on the wire.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// First [`ADDRESS_PREFIX_LEN`] characters of the sender's address.
    pub sender_prefix: String,
    /// Stringified account reputation, or [`REPUTATION_UNKNOWN`].
    pub reputation: String,
    /// Stringified round the carrying transaction was finalized in.
    pub round: String,
    /// Display name chosen by the sender.
    pub username: String,
    /// The message text.
    pub text: String,
}

// ---------------------------------------------------------------------------
// NotechatError
// ---------------------------------------------------------------------------

/// Central error type for the Notechat system.
///
/// All crates in the workspace convert their internal errors into
/// variants of this enum, ensuring a unified error handling surface.
#[derive(Debug, Error)]
pub enum NotechatError {
    /// A configuration value is invalid, missing, or the caller used
    /// the stream lifecycle out of order.
    #[error("config error: {reason}")]
    ConfigError {
        /// Human-readable description of the configuration problem.
        reason: String,
    },

    /// Encoding or decoding of the chat wire payload failed.
    ///
    /// On the decode side this is not fatal -- it marks a transaction
    /// note as "not chat traffic".
    #[error("codec error: {reason}")]
    CodecError {
        /// Human-readable description of the codec failure.
        reason: String,
    },

    /// A ledger node query or submission failed.
    #[error("ledger error: {reason}")]
    LedgerError {
        /// Human-readable description of the ledger failure.
        reason: String,
    },

    /// A key-custody service operation failed (handle, signing).
    #[error("custody error: {reason}")]
    CustodyError {
        /// Human-readable description of the custody failure.
        reason: String,
    },

    /// A transaction could not be built.
    #[error("transaction error: {reason}")]
    TxnError {
        /// Human-readable description of the transaction problem.
        reason: String,
    },

    /// A wallet-level problem (name not found, bad credentials).
    #[error("wallet error: {reason}")]
    WalletError {
        /// Human-readable description of the wallet problem.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Result alias
// ---------------------------------------------------------------------------

/// Convenience result type using [`NotechatError`].
pub type Result<T> = std::result::Result<T, NotechatError>;

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}, rep {}): {}",
            self.round, self.username, self.sender_prefix, self.reputation, self.text,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
