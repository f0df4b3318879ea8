//! Faucet claim orchestration.
//!
//! A claim is gated by the per-(user, token) cooldown, submitted as an
//! entry-function transaction against the configured faucet module, and
//! only a *confirmed* submission advances the cooldown clock.

use std::sync::Arc;

use thiserror::Error;

use crate::accounts::{Account, AccountAddress};
use crate::config::schema::FaucetConfig;
use crate::config::TokenConfig;
use crate::faucet::cooldown::{unix_now, CooldownTracker, Remaining};
use crate::node::TxHash;
use crate::observability::metrics;
use crate::txn::{DispatchError, Dispatcher, TransactionRequest};

/// Faucet-specific failures.
#[derive(Debug, Error)]
pub enum FaucetError {
    /// Claimed too soon; carries the display-ready remaining wait.
    #[error("faucet cooldown active for {symbol}: try again in {remaining}")]
    CooldownActive {
        symbol: String,
        remaining: Remaining,
    },

    #[error("'{0}' is not a supported token")]
    UnknownToken(String),

    #[error("invalid faucet module address: {0}")]
    BadModuleAddress(String),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Claims test tokens on behalf of registered users.
#[derive(Clone)]
pub struct FaucetService {
    dispatcher: Dispatcher,
    cooldowns: CooldownTracker,
    config: FaucetConfig,
    tokens: Arc<Vec<TokenConfig>>,
}

impl FaucetService {
    pub fn new(
        dispatcher: Dispatcher,
        config: FaucetConfig,
        tokens: Arc<Vec<TokenConfig>>,
    ) -> Self {
        let cooldowns = CooldownTracker::new(config.cooldown_secs);
        Self {
            dispatcher,
            cooldowns,
            config,
            tokens,
        }
    }

    /// Claim `symbol` for the account's user at the current wall clock.
    pub async fn claim(&self, account: &Account, symbol: &str) -> Result<TxHash, FaucetError> {
        self.claim_at(account, symbol, unix_now()).await
    }

    /// Clock-injected claim path; `now` is Unix seconds.
    pub async fn claim_at(
        &self,
        account: &Account,
        symbol: &str,
        now: u64,
    ) -> Result<TxHash, FaucetError> {
        let token = self
            .tokens
            .iter()
            .find(|t| t.symbol == symbol)
            .ok_or_else(|| FaucetError::UnknownToken(symbol.to_string()))?;

        if !self.cooldowns.is_eligible(account.user_id, symbol, now) {
            let remaining = self.cooldowns.remaining(account.user_id, symbol, now);
            metrics::record_cooldown_rejection(symbol);
            return Err(FaucetError::CooldownActive {
                symbol: symbol.to_string(),
                remaining,
            });
        }

        let module_address = AccountAddress::from_hex_literal(&self.config.module_address)
            .map_err(|e| FaucetError::BadModuleAddress(e.reason))?;

        let request = TransactionRequest {
            sender: account.address,
            module_address,
            module_name: self.config.module_name.clone(),
            function_name: self.config.function_name.clone(),
            type_args: vec![token.type_tag.clone()],
            args: vec![],
        };

        let hash = self.dispatcher.submit(account, request).await?;

        // Only a confirmed claim advances the cooldown.
        self.cooldowns.record_claim(account.user_id, symbol, now);
        metrics::record_faucet_claim(symbol);
        tracing::info!(
            user_id = account.user_id,
            token = symbol,
            tx_hash = %hash,
            "Faucet claim confirmed"
        );
        Ok(hash)
    }

    /// Per-token claim readiness at the current wall clock, for the
    /// selection keyboard ("tUSDC (Ready)", "tBTC (12m)").
    pub fn statuses(&self, user_id: u64) -> Vec<(String, Remaining)> {
        self.statuses_at(user_id, unix_now())
    }

    pub fn statuses_at(&self, user_id: u64, now: u64) -> Vec<(String, Remaining)> {
        self.tokens
            .iter()
            .map(|t| {
                let remaining = self.cooldowns.remaining(user_id, &t.symbol, now);
                (t.symbol.clone(), remaining)
            })
            .collect()
    }
}
