//! Stream configuration with documented defaults.
//!
//! All operational parameters of the relay are centralized here. The
//! historical magic numbers (1000-round lookback, 100-round validity
//! window, 100 ms confirmation poll) are named, overridable fields.

use serde::{Deserialize, Serialize};

use crate::{NotechatError, Result};

/// Default shared chat account address scanned for messages.
pub const DEFAULT_CHAT_ADDR: &str = "KPLD4GPZYXST7S2ALYSAVRCBWYBCUQCN6T4N6HAYCHCP4GOV7KWJUGITBE";

/// Default ledger node REST endpoint.
pub const DEFAULT_LEDGER_URL: &str = "http://localhost:8080";

/// Default key-custody service REST endpoint.
pub const DEFAULT_CUSTODY_URL: &str = "http://localhost:7833";

/// Configuration for one chat stream.
///
/// Identity fields (`wallet_name`, `wallet_password`, `from_addr`)
/// have no sensible defaults and must be provided by the caller;
/// `validate` rejects a config that leaves them empty.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Address of the shared chat account all messages are sent to.
    pub chat_addr: String,

    /// Base URL of the ledger node REST API.
    pub ledger_url: String,

    /// API token for the ledger node.
    pub ledger_token: String,

    /// Base URL of the key-custody service REST API.
    pub custody_url: String,

    /// API token for the key-custody service.
    pub custody_token: String,

    /// Name of the wallet that pays the transaction fees.
    pub wallet_name: String,

    /// Password of that wallet.
    pub wallet_password: String,

    /// Address inside the wallet the fees are paid from.
    pub from_addr: String,

    /// Display name attached to outgoing messages.
    pub username: String,

    /// How many historical rounds to scan backward from the current
    /// round at startup. 1000 is the platform's maximum queryable
    /// history.
    pub lookback_rounds: u64,

    /// How many rounds past the current round an outgoing transaction
    /// stays valid.
    pub validity_rounds: u64,

    /// Interval between confirmation-status polls, in milliseconds.
    pub poll_interval_ms: u64,

    /// Inbound queue capacity. Kept small on purpose: a full queue
    /// stalls the scanner, which is the intended throttle.
    pub inbound_capacity: usize,

    /// Outbound queue capacity. Small and fixed so UI submissions
    /// don't block on slow sends.
    pub outbound_capacity: usize,

    /// Status/log queue capacity. The consumer must keep draining it
    /// or the sender loop will stall once it fills.
    pub status_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chat_addr: DEFAULT_CHAT_ADDR.into(),
            ledger_url: DEFAULT_LEDGER_URL.into(),
            ledger_token: String::new(),
            custody_url: DEFAULT_CUSTODY_URL.into(),
            custody_token: String::new(),
            wallet_name: String::new(),
            wallet_password: String::new(),
            from_addr: String::new(),
            username: "Guest".into(),
            lookback_rounds: 1000,
            validity_rounds: 100,
            poll_interval_ms: 100,
            inbound_capacity: 1,
            outbound_capacity: 10,
            status_capacity: 10,
        }
    }
}

impl StreamConfig {
    /// Validates all configuration values.
    ///
    /// Returns an error if any value is outside its acceptable range
    /// or a required identity field is empty.
    pub fn validate(&self) -> Result<()> {
        if self.chat_addr.is_empty() {
            return Err(NotechatError::ConfigError {
                reason: "chat_addr must not be empty".into(),
            });
        }

        if self.ledger_url.is_empty() {
            return Err(NotechatError::ConfigError {
                reason: "ledger_url must not be empty".into(),
            });
        }

        if self.custody_url.is_empty() {
            return Err(NotechatError::ConfigError {
                reason: "custody_url must not be empty".into(),
            });
        }

        if self.wallet_name.is_empty() {
            return Err(NotechatError::ConfigError {
                reason: "wallet_name must not be empty".into(),
            });
        }

        if self.from_addr.is_empty() {
            return Err(NotechatError::ConfigError {
                reason: "from_addr must not be empty".into(),
            });
        }

        if self.username.is_empty() {
            return Err(NotechatError::ConfigError {
                reason: "username must not be empty".into(),
            });
        }

        if self.validity_rounds == 0 {
            return Err(NotechatError::ConfigError {
                reason: "validity_rounds must be greater than 0".into(),
            });
        }

        if self.poll_interval_ms == 0 {
            return Err(NotechatError::ConfigError {
                reason: "poll_interval_ms must be greater than 0".into(),
            });
        }

        if self.inbound_capacity == 0 {
            return Err(NotechatError::ConfigError {
                reason: "inbound_capacity must be greater than 0".into(),
            });
        }

        if self.outbound_capacity == 0 {
            return Err(NotechatError::ConfigError {
                reason: "outbound_capacity must be greater than 0".into(),
            });
        }

        if self.status_capacity == 0 {
            return Err(NotechatError::ConfigError {
                reason: "status_capacity must be greater than 0".into(),
            });
        }

        Ok(())
    }
}
