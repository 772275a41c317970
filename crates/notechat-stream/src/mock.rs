//! In-memory ledger and custody doubles for the task tests.
//!
//! Every trait call is appended to a shared call log so tests can
//! assert on ordering as well as outcomes. Calls that cannot be
//! answered from the scripted state park forever instead of erroring,
//! which lets shutdown and backpressure tests hold a task mid-await.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use notechat_ledger::{
    AccountInfo, Block, KeyCustody, LedgerClient, PendingStatus, SuggestedParams, UnsignedTxn,
    WalletInfo,
};
use notechat_types::{NotechatError, Result, Round};

// ---------------------------------------------------------------------------
// MockLedger
// ---------------------------------------------------------------------------

/// Scripted state backing a [`MockLedger`].
#[derive(Default)]
pub(crate) struct LedgerState {
    pub current_round: Option<Round>,
    pub blocks: HashMap<Round, Block>,
    pub failed_blocks: Vec<Round>,
    pub accounts: HashMap<String, u64>,
    pub params: Option<SuggestedParams>,
    pub params_failures: usize,
    pub submit_fail: bool,
    pub submitted: Vec<Vec<u8>>,
    pub pending: HashMap<String, Vec<PendingStatus>>,
    pub pending_fail: bool,
    pub calls: Vec<String>,
}

#[derive(Clone)]
pub(crate) struct MockLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl MockLedger {
    pub fn new(state: LedgerState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn insert_block(&self, round: Round, block: Block) {
        self.lock().blocks.insert(round, block);
    }

    pub fn fail_block(&self, round: Round) {
        self.lock().failed_blocks.push(round);
    }

    pub fn insert_account(&self, address: &str, reputation: u64) {
        self.lock().accounts.insert(address.to_string(), reputation);
    }

    pub fn set_pending(&self, tx_id: &str, statuses: Vec<PendingStatus>) {
        self.lock().pending.insert(tx_id.to_string(), statuses);
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn current_round(&self) -> Result<Round> {
        let mut state = self.lock();
        state.calls.push("current".to_string());
        state.current_round.ok_or_else(|| NotechatError::LedgerError {
            reason: "node status unavailable".to_string(),
        })
    }

    async fn wait_for_round(&self, round: Round) -> Result<Round> {
        {
            let mut state = self.lock();
            state.calls.push(format!("wait:{round}"));
            let ready = state.blocks.keys().any(|&r| r >= round)
                || state.failed_blocks.iter().any(|&r| r >= round);
            if ready {
                return Ok(round);
            }
        }
        // Not scripted yet: park forever, like a real long-poll would.
        std::future::pending().await
    }

    async fn block(&self, round: Round) -> Result<Block> {
        let mut state = self.lock();
        state.calls.push(format!("block:{round}"));
        if state.failed_blocks.contains(&round) {
            return Err(NotechatError::LedgerError {
                reason: format!("block {round} unavailable"),
            });
        }
        state
            .blocks
            .get(&round)
            .cloned()
            .ok_or_else(|| NotechatError::LedgerError {
                reason: format!("block {round} not scripted"),
            })
    }

    async fn account(&self, address: &str) -> Result<AccountInfo> {
        let mut state = self.lock();
        state.calls.push(format!("account:{address}"));
        state
            .accounts
            .get(address)
            .map(|&reputation| AccountInfo { reputation })
            .ok_or_else(|| NotechatError::LedgerError {
                reason: format!("account {address} not found"),
            })
    }

    async fn suggested_params(&self) -> Result<SuggestedParams> {
        let mut state = self.lock();
        state.calls.push("params".to_string());
        if state.params_failures > 0 {
            state.params_failures -= 1;
            return Err(NotechatError::LedgerError {
                reason: "params unavailable".to_string(),
            });
        }
        state.params.clone().ok_or_else(|| NotechatError::LedgerError {
            reason: "params not scripted".to_string(),
        })
    }

    async fn submit(&self, signed: &[u8]) -> Result<String> {
        let mut state = self.lock();
        state.calls.push("submit".to_string());
        if state.submit_fail {
            return Err(NotechatError::LedgerError {
                reason: "pool rejected the transaction".to_string(),
            });
        }
        state.submitted.push(signed.to_vec());
        Ok(format!("TX{}", state.submitted.len()))
    }

    async fn pending_status(&self, tx_id: &str) -> Result<PendingStatus> {
        let mut state = self.lock();
        state.calls.push(format!("pending:{tx_id}"));
        if state.pending_fail {
            return Err(NotechatError::LedgerError {
                reason: "pending lookup failed".to_string(),
            });
        }
        let statuses = state
            .pending
            .get_mut(tx_id)
            .ok_or_else(|| NotechatError::LedgerError {
                reason: format!("transaction {tx_id} unknown"),
            })?;
        // Replay the scripted sequence, repeating the final entry.
        if statuses.len() > 1 {
            Ok(statuses.remove(0))
        } else {
            statuses.first().cloned().ok_or_else(|| NotechatError::LedgerError {
                reason: format!("transaction {tx_id} unknown"),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// MockCustody
// ---------------------------------------------------------------------------

/// Scripted state backing a [`MockCustody`].
#[derive(Default)]
pub(crate) struct CustodyState {
    pub wallets: Vec<WalletInfo>,
    pub handle_fail: bool,
    pub sign_fail: bool,
    pub signed: Vec<UnsignedTxn>,
    pub calls: Vec<String>,
}

#[derive(Clone)]
pub(crate) struct MockCustody {
    state: Arc<Mutex<CustodyState>>,
}

impl MockCustody {
    pub fn new(state: CustodyState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CustodyState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn signed(&self) -> Vec<UnsignedTxn> {
        self.lock().signed.clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }
}

#[async_trait]
impl KeyCustody for MockCustody {
    async fn list_wallets(&self) -> Result<Vec<WalletInfo>> {
        let mut state = self.lock();
        state.calls.push("wallets".to_string());
        Ok(state.wallets.clone())
    }

    async fn init_wallet_handle(&self, wallet_id: &str, _password: &str) -> Result<String> {
        let mut state = self.lock();
        state.calls.push(format!("handle:{wallet_id}"));
        if state.handle_fail {
            return Err(NotechatError::CustodyError {
                reason: "wallet handle rejected".to_string(),
            });
        }
        Ok("handle-token".to_string())
    }

    async fn sign_transaction(
        &self,
        _handle: &str,
        _password: &str,
        txn: &UnsignedTxn,
    ) -> Result<Vec<u8>> {
        let mut state = self.lock();
        state.calls.push("sign".to_string());
        if state.sign_fail {
            return Err(NotechatError::CustodyError {
                reason: "signing rejected".to_string(),
            });
        }
        state.signed.push(txn.clone());
        Ok(b"signed".to_vec())
    }
}
