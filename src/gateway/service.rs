//! The operations exposed to the chat layer.
//!
//! Everything the conversational front-end can do goes through here:
//! register, summarize balances, begin and advance flows, claim from
//! the faucet. The gateway owns the session table and enforces the
//! abort-and-reset policy on fatal errors.

use std::sync::Arc;

use crate::accounts::{Account, AccountAddress, AccountRegistry, KeyProvider};
use crate::config::{GatewayConfig, TokenConfig};
use crate::faucet::{FaucetService, Remaining};
use crate::gateway::error::GatewayError;
use crate::marshal::TxArg;
use crate::node::{NodeClient, TxHash};
use crate::observability::metrics;
use crate::session::{Advance, FlowKind, FlowPayload, SessionManager, SessionState};
use crate::swap::SwapService;
use crate::txn::{Dispatcher, TransactionRequest};

/// One token's balance line in an account summary.
#[derive(Debug, Clone)]
pub struct TokenBalance {
    pub symbol: String,
    pub name: String,
    /// Human-readable amount, already scaled down by the token's decimals.
    pub display: String,
}

/// What `register_user` and `account_summary` return.
#[derive(Debug, Clone)]
pub struct AccountSummary {
    pub address: AccountAddress,
    pub balances: Vec<TokenBalance>,
}

/// Outcome of feeding one input to a flow.
#[derive(Debug, Clone)]
pub enum FlowOutcome {
    /// Flow continues; prompt for this state.
    Prompt(SessionState),
    /// Flow completed and its transaction was submitted.
    Submitted { intent: FlowKind, tx_hash: TxHash },
}

/// The conversational wallet core.
#[derive(Clone)]
pub struct Gateway {
    config: Arc<GatewayConfig>,
    tokens: Arc<Vec<TokenConfig>>,
    node: Arc<dyn NodeClient>,
    keys: Arc<dyn KeyProvider>,
    accounts: AccountRegistry,
    sessions: SessionManager,
    dispatcher: Dispatcher,
    faucet: FaucetService,
    swaps: SwapService,
}

impl Gateway {
    pub fn new(
        config: Arc<GatewayConfig>,
        node: Arc<dyn NodeClient>,
        keys: Arc<dyn KeyProvider>,
    ) -> Self {
        let tokens = Arc::new(config.tokens.clone());
        let dispatcher = Dispatcher::new(
            node.clone(),
            keys.clone(),
            config.transaction.clone(),
            config.node.chain_id,
        );
        let faucet = FaucetService::new(
            dispatcher.clone(),
            config.faucet.clone(),
            tokens.clone(),
        );
        let swaps = SwapService::new(
            node.clone(),
            dispatcher.clone(),
            config.swap.clone(),
            tokens.clone(),
        );
        Self {
            sessions: SessionManager::new(tokens.clone()),
            accounts: AccountRegistry::new(),
            tokens,
            node,
            keys,
            dispatcher,
            faucet,
            swaps,
            config,
        }
    }

    /// Create the user's account. Fails with a conflict if one exists.
    ///
    /// Fresh accounts are faucet-funded best-effort when configured; a
    /// funding failure logs a warning but the registration stands.
    pub async fn register_user(&self, user_id: u64) -> Result<AccountSummary, GatewayError> {
        if self.accounts.contains(user_id) {
            return Err(GatewayError::Registry(
                crate::accounts::RegistryError::AlreadyRegistered(user_id),
            ));
        }

        let (key, address) = self.keys.generate().await;
        let account = self.accounts.register(user_id, address, key)?;

        if self.config.node.faucet_funding {
            if let Err(e) = self.node.fund_with_faucet(&account.address).await {
                tracing::warn!(
                    user_id,
                    error = %e,
                    "Faucet funding for new account failed"
                );
            }
        }

        Ok(AccountSummary {
            address: account.address,
            balances: Vec::new(),
        })
    }

    /// Address plus per-token balances. A token whose balance query
    /// fails is listed as zero rather than sinking the whole summary.
    pub async fn account_summary(&self, user_id: u64) -> Result<AccountSummary, GatewayError> {
        let account = self.require_account(user_id)?;

        let mut balances = Vec::with_capacity(self.tokens.len());
        for token in self.tokens.iter() {
            let raw = match self.node.coin_balance(&account.address, &token.type_tag).await {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!(token = %token.symbol, error = %e, "Balance fetch failed");
                    0
                }
            };
            balances.push(TokenBalance {
                symbol: token.symbol.clone(),
                name: token.name.clone(),
                display: format_units(raw, token.decimals),
            });
        }

        Ok(AccountSummary {
            address: account.address,
            balances,
        })
    }

    /// Start a flow for the user; returns the first step's state.
    pub fn begin_flow(&self, user_id: u64, flow: FlowKind) -> Result<SessionState, GatewayError> {
        self.require_account(user_id)?;
        Ok(self.sessions.begin(user_id, flow)?)
    }

    /// Feed one input to the user's active flow. Completion submits the
    /// resulting transaction; any fatal error resets the flow to Idle.
    pub async fn advance_flow(&self, user_id: u64, input: &str) -> Result<FlowOutcome, GatewayError> {
        let account = self.require_account(user_id)?;

        match self.sessions.advance(user_id, input)? {
            Advance::Next(state) => Ok(FlowOutcome::Prompt(state)),
            Advance::Complete(payload) => {
                let intent = match payload {
                    FlowPayload::Send { .. } => FlowKind::Send,
                    FlowPayload::Swap { .. } => FlowKind::Swap,
                };
                match self.execute_payload(&account, payload).await {
                    Ok(tx_hash) => {
                        metrics::record_transaction(intent.name(), "submitted");
                        Ok(FlowOutcome::Submitted { intent, tx_hash })
                    }
                    Err(e) => {
                        metrics::record_transaction(intent.name(), "failed");
                        if e.resets_flow() {
                            self.sessions.reset(user_id);
                        }
                        Err(e)
                    }
                }
            }
        }
    }

    /// Claim `symbol` from the faucet, subject to the cooldown.
    pub async fn claim_faucet(&self, user_id: u64, symbol: &str) -> Result<TxHash, GatewayError> {
        let account = self.require_account(user_id)?;
        let hash = self.faucet.claim(&account, symbol).await?;
        metrics::record_transaction("faucet", "submitted");
        Ok(hash)
    }

    /// Per-token faucet readiness for the selection keyboard.
    pub fn faucet_statuses(&self, user_id: u64) -> Vec<(String, Remaining)> {
        self.faucet.statuses(user_id)
    }

    pub fn is_registered(&self, user_id: u64) -> bool {
        self.accounts.contains(user_id)
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Direct access for clock-injected faucet tests and operator tools.
    pub fn faucet(&self) -> &FaucetService {
        &self.faucet
    }

    async fn execute_payload(
        &self,
        account: &Account,
        payload: FlowPayload,
    ) -> Result<TxHash, GatewayError> {
        match payload {
            FlowPayload::Send { recipient, amount } => {
                let request = TransactionRequest {
                    sender: account.address,
                    module_address: AccountAddress::ONE,
                    module_name: "supra_account".to_string(),
                    function_name: "transfer".to_string(),
                    type_args: vec![],
                    args: vec![
                        TxArg::Address(recipient.to_vec()),
                        TxArg::Integer(amount),
                    ],
                };
                Ok(self.dispatcher.submit(account, request).await?)
            }
            FlowPayload::Swap {
                from_token,
                to_token,
                amount,
            } => Ok(self
                .swaps
                .execute(account, &from_token, &to_token, amount)
                .await?),
        }
    }

    fn require_account(&self, user_id: u64) -> Result<Account, GatewayError> {
        self.accounts.get(user_id).ok_or(GatewayError::NotRegistered)
    }
}

/// Render raw subunits as a decimal string, trimming trailing zeros.
fn format_units(raw: u128, decimals: u8) -> String {
    let Some(scale) = 10u128.checked_pow(decimals as u32) else {
        return raw.to_string();
    };
    let whole = raw / scale;
    let frac = raw % scale;
    if frac == 0 {
        return whole.to_string();
    }
    let frac_str = format!("{frac:0>width$}", width = decimals as usize);
    let trimmed = frac_str.trim_end_matches('0');
    format!("{whole}.{trimmed}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_units_with_trimmed_fractions() {
        assert_eq!(format_units(0, 8), "0");
        assert_eq!(format_units(500_000_000, 8), "5");
        assert_eq!(format_units(123_450_000, 8), "1.2345");
        assert_eq!(format_units(1, 6), "0.000001");
        assert_eq!(format_units(42, 0), "42");
        // Unscalable decimals fall back to the raw figure.
        assert_eq!(format_units(42, 40), "42");
    }
}
