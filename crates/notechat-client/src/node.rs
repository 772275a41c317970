//! Ledger node REST client.
//!
//! Endpoint map:
//!
//! - `GET  /v1/status`                              current round
//! - `GET  /v1/status/wait-for-block-after/{round}` blocking round wait
//! - `GET  /v1/block/{round}`                       block contents
//! - `GET  /v1/account/{address}`                   account metadata
//! - `GET  /v1/transactions/params`                 suggested params
//! - `POST /v1/transactions`                        submission
//! - `GET  /v1/transactions/pending/{txid}`         pending status
//!
//! The wait endpoint long-polls on the node side; no client-side
//! timeout is applied here -- cancellation is the stream core's job.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use notechat_ledger::{
    AccountInfo, Block, Connect, LedgerClient, PendingStatus, SuggestedParams,
};
use notechat_types::{NotechatError, Result, Round};

use crate::API_TOKEN_HEADER;

// ---------------------------------------------------------------------------
// NodeClient
// ---------------------------------------------------------------------------

/// HTTP client for the ledger node.
#[derive(Clone, Debug)]
pub struct NodeClient {
    base_url: String,
    token: String,
    http: reqwest::Client,
}

impl Connect for NodeClient {
    fn connect(url: &str, token: &str) -> Result<Self> {
        let parsed = reqwest::Url::parse(url).map_err(|e| NotechatError::ConfigError {
            reason: format!("invalid ledger node URL '{url}': {e}"),
        })?;

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| NotechatError::LedgerError {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            token: token.to_string(),
            http,
        })
    }
}

impl NodeClient {
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .header(API_TOKEN_HEADER, &self.token)
            .send()
            .await
            .map_err(|e| NotechatError::LedgerError {
                reason: format!("request to {path} failed: {e}"),
            })?
            .error_for_status()
            .map_err(|e| NotechatError::LedgerError {
                reason: format!("{path} returned an error status: {e}"),
            })?;

        response.json().await.map_err(|e| NotechatError::LedgerError {
            reason: format!("invalid response body from {path}: {e}"),
        })
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let response = self
            .http
            .post(format!("{}{path}", self.base_url))
            .header(API_TOKEN_HEADER, &self.token)
            .json(body)
            .send()
            .await
            .map_err(|e| NotechatError::LedgerError {
                reason: format!("request to {path} failed: {e}"),
            })?
            .error_for_status()
            .map_err(|e| NotechatError::LedgerError {
                reason: format!("{path} returned an error status: {e}"),
            })?;

        response.json().await.map_err(|e| NotechatError::LedgerError {
            reason: format!("invalid response body from {path}: {e}"),
        })
    }
}

// ---------------------------------------------------------------------------
// Wire DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct StatusResponse {
    last_round: Round,
}

#[derive(Debug, Serialize)]
struct SubmitRequest {
    #[serde(with = "hex::serde")]
    signed_transaction: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    tx_id: String,
}

// ---------------------------------------------------------------------------
// LedgerClient impl
// ---------------------------------------------------------------------------

#[async_trait]
impl LedgerClient for NodeClient {
    async fn current_round(&self) -> Result<Round> {
        let status: StatusResponse = self.get_json("/v1/status").await?;
        Ok(status.last_round)
    }

    async fn wait_for_round(&self, round: Round) -> Result<Round> {
        let status: StatusResponse = self
            .get_json(&format!("/v1/status/wait-for-block-after/{round}"))
            .await?;
        Ok(status.last_round)
    }

    async fn block(&self, round: Round) -> Result<Block> {
        self.get_json(&format!("/v1/block/{round}")).await
    }

    async fn account(&self, address: &str) -> Result<AccountInfo> {
        self.get_json(&format!("/v1/account/{address}")).await
    }

    async fn suggested_params(&self) -> Result<SuggestedParams> {
        self.get_json("/v1/transactions/params").await
    }

    async fn submit(&self, signed: &[u8]) -> Result<String> {
        let request = SubmitRequest {
            signed_transaction: signed.to_vec(),
        };
        let response: SubmitResponse = self.post_json("/v1/transactions", &request).await?;
        Ok(response.tx_id)
    }

    async fn pending_status(&self, tx_id: &str) -> Result<PendingStatus> {
        self.get_json(&format!("/v1/transactions/pending/{tx_id}"))
            .await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
