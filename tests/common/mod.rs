//! Shared test doubles for the end-to-end flow tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use wallet_gateway::accounts::{AccountAddress, DevKeyProvider, SignedTransaction};
use wallet_gateway::chat::Router;
use wallet_gateway::config::GatewayConfig;
use wallet_gateway::node::{NodeClient, NodeError, TxHash, TxStatus};
use wallet_gateway::Gateway;

/// Programmable in-process node: per-coin-type balances, a fixed
/// sequence number, recorded submissions, immediate confirmation.
pub struct FakeNode {
    pub sequence: u64,
    balances: Mutex<HashMap<String, u128>>,
    pub submitted: Mutex<Vec<SignedTransaction>>,
    pub faucet_fundings: AtomicU32,
    submit_delay: Mutex<Option<Duration>>,
}

impl FakeNode {
    pub fn new() -> Self {
        Self {
            sequence: 0,
            balances: Mutex::new(HashMap::new()),
            submitted: Mutex::new(Vec::new()),
            faucet_fundings: AtomicU32::new(0),
            submit_delay: Mutex::new(None),
        }
    }

    /// Make every submission take this long, to widen race windows.
    #[allow(dead_code)]
    pub fn set_submit_delay(&self, delay: Duration) {
        *self.submit_delay.lock().unwrap() = Some(delay);
    }

    /// Seed the balance every account reads for `coin_type`.
    pub fn set_balance(&self, coin_type: &str, raw: u128) {
        self.balances
            .lock()
            .unwrap()
            .insert(coin_type.to_string(), raw);
    }

    pub fn submission_count(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }
}

#[async_trait]
impl NodeClient for FakeNode {
    async fn sequence_number(&self, _: &AccountAddress) -> Result<u64, NodeError> {
        Ok(self.sequence)
    }

    async fn coin_balance(&self, _: &AccountAddress, coin_type: &str) -> Result<u128, NodeError> {
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(coin_type)
            .copied()
            .unwrap_or(0))
    }

    async fn submit(&self, signed: &SignedTransaction) -> Result<TxHash, NodeError> {
        let delay = *self.submit_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut submitted = self.submitted.lock().unwrap();
        submitted.push(signed.clone());
        Ok(TxHash(format!("0xhash{}", submitted.len())))
    }

    async fn transaction_status(&self, _: &TxHash) -> Result<TxStatus, NodeError> {
        Ok(TxStatus::Success)
    }

    async fn fund_with_faucet(&self, _: &AccountAddress) -> Result<(), NodeError> {
        self.faucet_fundings.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Default tokens, fast confirmation, no live endpoints reached.
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::with_default_tokens();
    config.transaction.confirmation_timeout_secs = 2;
    config.transaction.confirmation_poll_secs = 1;
    config
}

pub fn test_gateway(node: Arc<FakeNode>) -> Gateway {
    Gateway::new(
        Arc::new(test_config()),
        node,
        Arc::new(DevKeyProvider::new()),
    )
}

#[allow(dead_code)]
pub fn test_router(node: Arc<FakeNode>) -> Router {
    Router::new(test_gateway(node))
}
