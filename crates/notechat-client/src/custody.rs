//! Key-custody service REST client.
//!
//! Endpoint map:
//!
//! - `GET  /v1/wallets`           list wallets
//! - `POST /v1/wallet/init`       open a wallet handle
//! - `POST /v1/transaction/sign`  sign an unsigned transaction
//!
//! The wallet password travels in the request body over the local
//! custody connection, exactly as the custody service's own API
//! expects; the signed transaction comes back hex-encoded.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use notechat_ledger::{Connect, KeyCustody, UnsignedTxn, WalletInfo};
use notechat_types::{NotechatError, Result};

use crate::API_TOKEN_HEADER;

// ---------------------------------------------------------------------------
// CustodyClient
// ---------------------------------------------------------------------------

/// HTTP client for the key-custody service.
#[derive(Clone, Debug)]
pub struct CustodyClient {
    base_url: String,
    token: String,
    http: reqwest::Client,
}

impl Connect for CustodyClient {
    fn connect(url: &str, token: &str) -> Result<Self> {
        let parsed = reqwest::Url::parse(url).map_err(|e| NotechatError::ConfigError {
            reason: format!("invalid custody service URL '{url}': {e}"),
        })?;

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| NotechatError::CustodyError {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            token: token.to_string(),
            http,
        })
    }
}

impl CustodyClient {
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .header(API_TOKEN_HEADER, &self.token)
            .send()
            .await
            .map_err(|e| NotechatError::CustodyError {
                reason: format!("request to {path} failed: {e}"),
            })?
            .error_for_status()
            .map_err(|e| NotechatError::CustodyError {
                reason: format!("{path} returned an error status: {e}"),
            })?;

        response.json().await.map_err(|e| NotechatError::CustodyError {
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
            .map_err(|e| NotechatError::CustodyError {
                reason: format!("request to {path} failed: {e}"),
            })?
            .error_for_status()
            .map_err(|e| NotechatError::CustodyError {
                reason: format!("{path} returned an error status: {e}"),
            })?;

        response.json().await.map_err(|e| NotechatError::CustodyError {
            reason: format!("invalid response body from {path}: {e}"),
        })
    }
}

// ---------------------------------------------------------------------------
// Wire DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ListWalletsResponse {
    #[serde(default)]
    wallets: Vec<WalletInfo>,
}

#[derive(Debug, Serialize)]
struct InitHandleRequest<'a> {
    wallet_id: &'a str,
    wallet_password: &'a str,
}

#[derive(Debug, Deserialize)]
struct InitHandleResponse {
    wallet_handle_token: String,
}

#[derive(Debug, Serialize)]
struct SignRequest<'a> {
    wallet_handle_token: &'a str,
    wallet_password: &'a str,
    transaction: &'a UnsignedTxn,
}

#[derive(Debug, Deserialize)]
struct SignResponse {
    #[serde(with = "hex::serde")]
    signed_transaction: Vec<u8>,
}

// ---------------------------------------------------------------------------
// KeyCustody impl
// ---------------------------------------------------------------------------

#[async_trait]
impl KeyCustody for CustodyClient {
    async fn list_wallets(&self) -> Result<Vec<WalletInfo>> {
        let response: ListWalletsResponse = self.get_json("/v1/wallets").await?;
        Ok(response.wallets)
    }

    async fn init_wallet_handle(&self, wallet_id: &str, password: &str) -> Result<String> {
        let request = InitHandleRequest {
            wallet_id,
            wallet_password: password,
        };
        let response: InitHandleResponse = self.post_json("/v1/wallet/init", &request).await?;
        Ok(response.wallet_handle_token)
    }

    async fn sign_transaction(
        &self,
        handle: &str,
        password: &str,
        txn: &UnsignedTxn,
    ) -> Result<Vec<u8>> {
        let request = SignRequest {
            wallet_handle_token: handle,
            wallet_password: password,
            transaction: txn,
        };
        let response: SignResponse = self.post_json("/v1/transaction/sign", &request).await?;
        Ok(response.signed_transaction)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
