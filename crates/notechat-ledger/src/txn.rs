//! Unsigned payment transaction construction.
//!
//! Chat messages ride in zero-amount payments: the note is the
//! payload, not a value transfer. The custody service signs the
//! structure produced here; the core never sees key material.

use serde::{Deserialize, Serialize};

use notechat_types::{NotechatError, Result, Round};

use crate::types::SuggestedParams;

// ---------------------------------------------------------------------------
// UnsignedTxn
// ---------------------------------------------------------------------------

/// A payment transaction awaiting signature.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct UnsignedTxn {
    /// Paying account.
    pub sender: String,
    /// Receiving account.
    pub receiver: String,
    /// Fee in base units.
    pub fee: u64,
    /// Transferred amount in base units.
    pub amount: u64,
    /// First round the transaction is valid in.
    pub first_valid: Round,
    /// Last round the transaction is valid in.
    pub last_valid: Round,
    /// Genesis identifier binding the transaction to one network.
    pub genesis_id: String,
    /// Genesis hash binding the transaction to one network.
    pub genesis_hash: String,
    /// Opaque note bytes.
    #[serde(default, with = "hex::serde")]
    pub note: Vec<u8>,
}

impl UnsignedTxn {
    /// Builds a payment transaction from suggested parameters.
    ///
    /// The transaction is valid from the parameters' last round
    /// through `validity_rounds` rounds after it.
    ///
    /// # Errors
    ///
    /// `NotechatError::TxnError` if either address is empty or the
    /// validity window is degenerate.
    pub fn payment(
        sender: &str,
        receiver: &str,
        amount: u64,
        note: Vec<u8>,
        params: &SuggestedParams,
        validity_rounds: u64,
    ) -> Result<Self> {
        if sender.is_empty() {
            return Err(NotechatError::TxnError {
                reason: "sender address must not be empty".into(),
            });
        }
        if receiver.is_empty() {
            return Err(NotechatError::TxnError {
                reason: "receiver address must not be empty".into(),
            });
        }
        if validity_rounds == 0 {
            return Err(NotechatError::TxnError {
                reason: "validity window must span at least one round".into(),
            });
        }

        Ok(Self {
            sender: sender.into(),
            receiver: receiver.into(),
            fee: params.fee,
            amount,
            first_valid: params.last_round,
            last_valid: params.last_round + validity_rounds,
            genesis_id: params.genesis_id.clone(),
            genesis_hash: params.genesis_hash.clone(),
            note,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
