//! Swap execution: balance pre-check, quote, dispatch.

use std::sync::Arc;

use crate::accounts::{Account, AccountAddress};
use crate::config::schema::SwapConfig;
use crate::config::TokenConfig;
use crate::marshal::TxArg;
use crate::node::{NodeClient, TxHash};
use crate::swap::quote::{QuoteClient, QuoteRequest};
use crate::swap::SwapError;
use crate::txn::{Dispatcher, TransactionRequest};

/// Executes completed swap flows against the configured router module.
#[derive(Clone)]
pub struct SwapService {
    node: Arc<dyn NodeClient>,
    dispatcher: Dispatcher,
    quotes: QuoteClient,
    config: SwapConfig,
    tokens: Arc<Vec<TokenConfig>>,
}

impl SwapService {
    pub fn new(
        node: Arc<dyn NodeClient>,
        dispatcher: Dispatcher,
        config: SwapConfig,
        tokens: Arc<Vec<TokenConfig>>,
    ) -> Self {
        let quotes = QuoteClient::new(&config);
        Self {
            node,
            dispatcher,
            quotes,
            config,
            tokens,
        }
    }

    /// Swap `amount` subunits of `from_symbol` into `to_symbol`.
    ///
    /// The balance check runs before the quote fetch; an underfunded
    /// swap never reaches the quote service or the chain.
    pub async fn execute(
        &self,
        account: &Account,
        from_symbol: &str,
        to_symbol: &str,
        amount: u64,
    ) -> Result<TxHash, SwapError> {
        let from = self.require_token(from_symbol)?;
        let to = self.require_token(to_symbol)?;

        let available = self
            .node
            .coin_balance(&account.address, &from.type_tag)
            .await?;
        if available < u128::from(amount) {
            return Err(SwapError::InsufficientBalance {
                symbol: from.symbol.clone(),
                available,
                required: u128::from(amount),
            });
        }

        let quote = self
            .quotes
            .fetch(&QuoteRequest {
                input_token_type: from.type_tag.clone(),
                output_token_type: to.type_tag.clone(),
                amount_in: amount,
            })
            .await?;

        // Quote arguments arrive loosely typed; the precedence-ordered
        // converter tags each one before encoding.
        let args = quote
            .arguments
            .iter()
            .map(TxArg::from_value)
            .collect::<Result<Vec<_>, _>>()?;

        let router_address = AccountAddress::from_hex_literal(&self.config.router_address)
            .map_err(|e| SwapError::BadRouterAddress(e.reason))?;

        let request = TransactionRequest {
            sender: account.address,
            module_address: router_address,
            module_name: self.config.router_module.clone(),
            function_name: self.config.router_function.clone(),
            type_args: quote.type_arguments,
            args,
        };

        let hash = self.dispatcher.submit(account, request).await?;
        tracing::info!(
            user_id = account.user_id,
            from = from_symbol,
            to = to_symbol,
            amount,
            tx_hash = %hash,
            "Swap submitted"
        );
        Ok(hash)
    }

    fn require_token(&self, symbol: &str) -> Result<&TokenConfig, SwapError> {
        self.tokens
            .iter()
            .find(|t| t.symbol == symbol)
            .ok_or_else(|| SwapError::UnknownToken(symbol.to_string()))
    }
}
