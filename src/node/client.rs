//! Node REST client with timeout and error handling.
//!
//! # Responsibilities
//! - Query chain state (sequence numbers, coin balances)
//! - Submit signed transactions and poll their status
//! - Handle timeouts and network errors gracefully
//!
//! The trait is the boundary; `HttpNodeClient` is the production-shaped
//! implementation, and tests substitute in-process fakes.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tokio::time::timeout;

use crate::accounts::{AccountAddress, SignedTransaction};
use crate::config::NodeConfig;

/// Identifier of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TxHash(pub String);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors from node interaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    /// Connection, protocol, or server-side failure.
    #[error("node unavailable: {0}")]
    Unavailable(String),

    /// The queried account does not exist on chain.
    #[error("account not found: {0}")]
    AccountNotFound(String),

    /// The request exceeded the configured timeout.
    #[error("node request timed out after {0} seconds")]
    Timeout(u64),
}

/// On-chain status of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxStatus {
    Pending,
    Success,
    Failed(String),
}

/// Boundary trait for everything the gateway asks of the chain.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Current sequence number for an account.
    async fn sequence_number(&self, address: &AccountAddress) -> Result<u64, NodeError>;

    /// Balance of `coin_type` held by `address`, in raw subunits.
    /// An account without the coin store reads as zero.
    async fn coin_balance(
        &self,
        address: &AccountAddress,
        coin_type: &str,
    ) -> Result<u128, NodeError>;

    /// Submit a signed transaction, returning its hash.
    async fn submit(&self, signed: &SignedTransaction) -> Result<TxHash, NodeError>;

    /// Look up the status of a previously submitted transaction.
    async fn transaction_status(&self, hash: &TxHash) -> Result<TxStatus, NodeError>;

    /// Ask the node faucet to fund a fresh account with gas money.
    async fn fund_with_faucet(&self, address: &AccountAddress) -> Result<(), NodeError>;
}

/// REST implementation against the node's `rpc/v1` API.
#[derive(Clone)]
pub struct HttpNodeClient {
    http: reqwest::Client,
    base_url: url::Url,
    timeout_duration: Duration,
}

#[derive(Deserialize)]
struct AccountInfoResponse {
    sequence_number: String,
}

#[derive(Deserialize)]
struct BalanceResponse {
    balance: String,
}

#[derive(Deserialize)]
struct SubmitResponse {
    hash: String,
}

#[derive(Deserialize)]
struct TransactionStatusResponse {
    status: String,
    #[serde(default)]
    vm_status: Option<String>,
}

impl HttpNodeClient {
    pub fn new(config: &NodeConfig) -> Result<Self, NodeError> {
        let base_url: url::Url = config
            .rest_url
            .parse()
            .map_err(|e| NodeError::Unavailable(format!("invalid node URL: {e}")))?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            timeout_duration: Duration::from_secs(config.request_timeout_secs),
        })
    }

    fn endpoint(&self, path: &str) -> Result<url::Url, NodeError> {
        self.base_url
            .join(path)
            .map_err(|e| NodeError::Unavailable(format!("bad endpoint path '{path}': {e}")))
    }

    /// Run a request under the configured timeout, mapping transport
    /// errors uniformly.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, NodeError> {
        let secs = self.timeout_duration.as_secs();
        let response = timeout(self.timeout_duration, request.send())
            .await
            .map_err(|_| NodeError::Timeout(secs))?
            .map_err(|e| NodeError::Unavailable(e.to_string()))?;
        Ok(response)
    }
}

#[async_trait]
impl NodeClient for HttpNodeClient {
    async fn sequence_number(&self, address: &AccountAddress) -> Result<u64, NodeError> {
        let url = self.endpoint(&format!("rpc/v1/accounts/{address}"))?;
        let response = self.send(self.http.get(url)).await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(NodeError::AccountNotFound(address.to_string()));
        }
        if !response.status().is_success() {
            return Err(NodeError::Unavailable(format!(
                "account query returned {}",
                response.status()
            )));
        }

        let info: AccountInfoResponse = response
            .json()
            .await
            .map_err(|e| NodeError::Unavailable(format!("malformed account response: {e}")))?;
        info.sequence_number
            .parse()
            .map_err(|e| NodeError::Unavailable(format!("malformed sequence number: {e}")))
    }

    async fn coin_balance(
        &self,
        address: &AccountAddress,
        coin_type: &str,
    ) -> Result<u128, NodeError> {
        let mut url = self.endpoint(&format!("rpc/v1/accounts/{address}/coin_balance"))?;
        url.query_pairs_mut().append_pair("coin_type", coin_type);
        let response = self.send(self.http.get(url)).await?;

        // Missing coin store reads as zero, matching how the summary
        // lists unfunded tokens.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(0);
        }
        if !response.status().is_success() {
            return Err(NodeError::Unavailable(format!(
                "balance query returned {}",
                response.status()
            )));
        }

        let body: BalanceResponse = response
            .json()
            .await
            .map_err(|e| NodeError::Unavailable(format!("malformed balance response: {e}")))?;
        body.balance
            .parse()
            .map_err(|e| NodeError::Unavailable(format!("malformed balance: {e}")))
    }

    async fn submit(&self, signed: &SignedTransaction) -> Result<TxHash, NodeError> {
        let url = self.endpoint("rpc/v1/transactions/submit")?;
        let body = serde_json::json!({
            "raw_transaction": hex::encode(&signed.raw),
            "signature": hex::encode(&signed.signature),
            "public_key": hex::encode(&signed.public_key),
        });
        let response = self.send(self.http.post(url).json(&body)).await?;

        if !response.status().is_success() {
            return Err(NodeError::Unavailable(format!(
                "submission returned {}",
                response.status()
            )));
        }

        let body: SubmitResponse = response
            .json()
            .await
            .map_err(|e| NodeError::Unavailable(format!("malformed submit response: {e}")))?;
        Ok(TxHash(body.hash))
    }

    async fn transaction_status(&self, hash: &TxHash) -> Result<TxStatus, NodeError> {
        let url = self.endpoint(&format!("rpc/v1/transactions/{hash}"))?;
        let response = self.send(self.http.get(url)).await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(TxStatus::Pending);
        }
        if !response.status().is_success() {
            return Err(NodeError::Unavailable(format!(
                "status query returned {}",
                response.status()
            )));
        }

        let body: TransactionStatusResponse = response
            .json()
            .await
            .map_err(|e| NodeError::Unavailable(format!("malformed status response: {e}")))?;
        let status = match body.status.as_str() {
            "Success" => TxStatus::Success,
            "Pending" => TxStatus::Pending,
            "Failed" => TxStatus::Failed(
                body.vm_status.unwrap_or_else(|| "unknown failure".to_string()),
            ),
            other => TxStatus::Failed(format!("unexpected status '{other}'")),
        };
        Ok(status)
    }

    async fn fund_with_faucet(&self, address: &AccountAddress) -> Result<(), NodeError> {
        let url = self.endpoint(&format!("rpc/v1/wallet/faucet/{address}"))?;
        let response = self.send(self.http.post(url)).await?;
        if !response.status().is_success() {
            return Err(NodeError::Unavailable(format!(
                "faucet funding returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NodeConfig;

    #[test]
    fn builds_endpoints_from_base_url() {
        let client = HttpNodeClient::new(&NodeConfig::default()).unwrap();
        let url = client.endpoint("rpc/v1/transactions/submit").unwrap();
        assert!(url.as_str().ends_with("rpc/v1/transactions/submit"));
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let config = NodeConfig {
            rest_url: "not a url".to_string(),
            ..NodeConfig::default()
        };
        assert!(matches!(
            HttpNodeClient::new(&config),
            Err(NodeError::Unavailable(_))
        ));
    }
}
