//! Transaction submission orchestration.
//!
//! # Responsibilities
//! - Resolve the sender's sequence number
//! - Marshal type tags and value arguments
//! - Build, sign, and submit the raw envelope
//! - Optionally poll for confirmation
//!
//! Submission is attempted exactly once per completed flow. No automatic
//! retry: resubmitting with a stale sequence number is unsafe, so retries
//! are an operator decision.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{interval, timeout};

use crate::accounts::{Account, KeyError, KeyProvider};
use crate::config::TransactionConfig;
use crate::faucet::cooldown::unix_now;
use crate::marshal::{MarshalError, TypeTag, TypeTagParseError};
use crate::node::{NodeClient, NodeError, TxHash, TxStatus};
use crate::txn::request::{RawTransaction, TransactionRequest};

/// Failures along the submission path. Every variant is fatal to the
/// in-flight flow; the gateway resets the session on seeing one.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Node(#[from] NodeError),

    #[error(transparent)]
    Marshal(#[from] MarshalError),

    #[error(transparent)]
    TypeTag(#[from] TypeTagParseError),

    #[error("signing failed: {0}")]
    Signing(#[from] KeyError),

    /// The node accepted the transaction but it failed execution.
    #[error("transaction {hash} failed on-chain: {reason}")]
    Rejected { hash: TxHash, reason: String },

    /// Confirmation polling exhausted its budget; the transaction may
    /// still land, so the hash is included for manual follow-up.
    #[error("transaction {hash} not confirmed after {waited_secs} seconds")]
    ConfirmationTimeout { hash: TxHash, waited_secs: u64 },
}

/// Builds and submits entry-function transactions.
#[derive(Clone)]
pub struct Dispatcher {
    node: Arc<dyn NodeClient>,
    keys: Arc<dyn KeyProvider>,
    config: TransactionConfig,
    chain_id: u8,
}

impl Dispatcher {
    pub fn new(
        node: Arc<dyn NodeClient>,
        keys: Arc<dyn KeyProvider>,
        config: TransactionConfig,
        chain_id: u8,
    ) -> Self {
        Self {
            node,
            keys,
            config,
            chain_id,
        }
    }

    /// Submit one entry-function call on behalf of `account`.
    ///
    /// Returns the transaction hash once submitted (and confirmed, if
    /// confirmation waiting is configured).
    pub async fn submit(
        &self,
        account: &Account,
        request: TransactionRequest,
    ) -> Result<TxHash, DispatchError> {
        let sequence_number = self.node.sequence_number(&request.sender).await?;

        let type_tags = request
            .type_args
            .iter()
            .map(|s| TypeTag::parse(s))
            .collect::<Result<Vec<_>, _>>()?;
        let encoded_args = request.args.iter().map(|a| a.encode()).collect();

        let raw = RawTransaction::from_request(
            &request,
            sequence_number,
            type_tags,
            encoded_args,
            &self.config,
            unix_now(),
            self.chain_id,
        );

        let signed = self.keys.sign(&account.key, &raw.to_bytes()).await?;
        let hash = self.node.submit(&signed).await?;

        tracing::info!(
            sender = %request.sender,
            module = %format!("{}::{}", request.module_name, request.function_name),
            sequence_number,
            tx_hash = %hash,
            "Transaction submitted"
        );

        if self.config.wait_for_confirmation {
            self.wait_for_confirmation(&hash).await?;
        }
        Ok(hash)
    }

    /// Poll the node until the transaction lands or the budget expires.
    async fn wait_for_confirmation(&self, hash: &TxHash) -> Result<(), DispatchError> {
        let budget = Duration::from_secs(self.config.confirmation_timeout_secs);
        let poll = Duration::from_secs(self.config.confirmation_poll_secs);

        let result = timeout(budget, async {
            let mut ticker = interval(poll);
            loop {
                ticker.tick().await;
                match self.node.transaction_status(hash).await? {
                    TxStatus::Pending => {
                        tracing::debug!(tx_hash = %hash, "Transaction pending");
                    }
                    TxStatus::Success => return Ok(()),
                    TxStatus::Failed(reason) => {
                        return Err(DispatchError::Rejected {
                            hash: hash.clone(),
                            reason,
                        })
                    }
                }
            }
        })
        .await;

        match result {
            Ok(inner) => inner,
            Err(_) => Err(DispatchError::ConfirmationTimeout {
                hash: hash.clone(),
                waited_secs: self.config.confirmation_timeout_secs,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::{AccountAddress, DevKeyProvider, SignedTransaction};
    use crate::marshal::TxArg;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Scripted node double: fixed sequence number, records submissions,
    /// plays back a status sequence.
    struct ScriptedNode {
        sequence: u64,
        submitted: Mutex<Vec<SignedTransaction>>,
        statuses: Mutex<Vec<TxStatus>>,
        status_calls: AtomicU32,
    }

    impl ScriptedNode {
        fn new(sequence: u64, statuses: Vec<TxStatus>) -> Self {
            Self {
                sequence,
                submitted: Mutex::new(Vec::new()),
                statuses: Mutex::new(statuses),
                status_calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl NodeClient for ScriptedNode {
        async fn sequence_number(&self, _: &AccountAddress) -> Result<u64, NodeError> {
            Ok(self.sequence)
        }

        async fn coin_balance(&self, _: &AccountAddress, _: &str) -> Result<u128, NodeError> {
            Ok(0)
        }

        async fn submit(&self, signed: &SignedTransaction) -> Result<TxHash, NodeError> {
            self.submitted.lock().unwrap().push(signed.clone());
            Ok(TxHash("0xfeed".to_string()))
        }

        async fn transaction_status(&self, _: &TxHash) -> Result<TxStatus, NodeError> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            let mut statuses = self.statuses.lock().unwrap();
            if statuses.len() > 1 {
                Ok(statuses.remove(0))
            } else {
                Ok(statuses[0].clone())
            }
        }

        async fn fund_with_faucet(&self, _: &AccountAddress) -> Result<(), NodeError> {
            Ok(())
        }
    }

    async fn test_account(keys: &DevKeyProvider) -> Account {
        let (key, address) = keys.generate().await;
        Account {
            user_id: 1,
            address,
            key,
        }
    }

    fn transfer_request(sender: AccountAddress) -> TransactionRequest {
        TransactionRequest {
            sender,
            module_address: AccountAddress::from_hex_literal("0x1").unwrap(),
            module_name: "supra_account".to_string(),
            function_name: "transfer".to_string(),
            type_args: vec!["0x1::supra_coin::SupraCoin".to_string()],
            args: vec![TxArg::Address(vec![0x02; 32]), TxArg::Integer(500)],
        }
    }

    fn fast_config() -> TransactionConfig {
        TransactionConfig {
            wait_for_confirmation: true,
            confirmation_timeout_secs: 2,
            confirmation_poll_secs: 1,
            ..TransactionConfig::default()
        }
    }

    #[tokio::test]
    async fn submits_signed_envelope_and_confirms() {
        let node = Arc::new(ScriptedNode::new(
            7,
            vec![TxStatus::Pending, TxStatus::Success],
        ));
        let keys = Arc::new(DevKeyProvider::new());
        let account = test_account(&keys).await;
        let dispatcher = Dispatcher::new(node.clone(), keys, fast_config(), 6);

        let hash = dispatcher
            .submit(&account, transfer_request(account.address))
            .await
            .unwrap();
        assert_eq!(hash.to_string(), "0xfeed");

        let submitted = node.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        // Envelope carries the node's sequence number.
        let raw = &submitted[0].raw;
        assert_eq!(&raw[32..40], &7u64.to_le_bytes());
        assert_eq!(submitted[0].signature.len(), 64);
    }

    #[tokio::test]
    async fn on_chain_failure_is_surfaced_as_rejected() {
        let node = Arc::new(ScriptedNode::new(
            0,
            vec![TxStatus::Failed("E_INSUFFICIENT_FUNDS".to_string())],
        ));
        let keys = Arc::new(DevKeyProvider::new());
        let account = test_account(&keys).await;
        let dispatcher = Dispatcher::new(node, keys, fast_config(), 6);

        let err = dispatcher
            .submit(&account, transfer_request(account.address))
            .await
            .unwrap_err();
        match err {
            DispatchError::Rejected { reason, .. } => {
                assert!(reason.contains("E_INSUFFICIENT_FUNDS"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn malformed_type_tag_fails_before_any_submission() {
        let node = Arc::new(ScriptedNode::new(0, vec![TxStatus::Success]));
        let keys = Arc::new(DevKeyProvider::new());
        let account = test_account(&keys).await;
        let dispatcher = Dispatcher::new(node.clone(), keys, fast_config(), 6);

        let mut request = transfer_request(account.address);
        request.type_args = vec!["0x1::broken".to_string()];

        let err = dispatcher.submit(&account, request).await.unwrap_err();
        assert!(matches!(err, DispatchError::TypeTag(_)));
        assert!(node.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn confirmation_budget_exhaustion_reports_the_hash() {
        let node = Arc::new(ScriptedNode::new(0, vec![TxStatus::Pending]));
        let keys = Arc::new(DevKeyProvider::new());
        let account = test_account(&keys).await;
        let config = TransactionConfig {
            confirmation_timeout_secs: 1,
            confirmation_poll_secs: 1,
            ..fast_config()
        };
        let dispatcher = Dispatcher::new(node, keys, config, 6);

        let err = dispatcher
            .submit(&account, transfer_request(account.address))
            .await
            .unwrap_err();
        match err {
            DispatchError::ConfirmationTimeout { hash, .. } => {
                assert_eq!(hash.to_string(), "0xfeed");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn skips_confirmation_when_disabled() {
        let node = Arc::new(ScriptedNode::new(0, vec![TxStatus::Pending]));
        let keys = Arc::new(DevKeyProvider::new());
        let account = test_account(&keys).await;
        let config = TransactionConfig {
            wait_for_confirmation: false,
            ..TransactionConfig::default()
        };
        let dispatcher = Dispatcher::new(node.clone(), keys, config, 6);

        dispatcher
            .submit(&account, transfer_request(account.address))
            .await
            .unwrap();
        assert_eq!(node.status_calls.load(Ordering::SeqCst), 0);
    }
}
