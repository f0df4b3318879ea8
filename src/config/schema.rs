//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! gateway. All types derive Serde traits for deserialization from
//! config files; every section has defaults so a minimal config works.

use serde::{Deserialize, Serialize};

/// Root configuration for the wallet gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Node REST endpoint settings.
    pub node: NodeConfig,

    /// Raw-transaction envelope parameters.
    pub transaction: TransactionConfig,

    /// Swap-quote service and router module.
    pub swap: SwapConfig,

    /// Faucet module and cooldown window.
    pub faucet: FaucetConfig,

    /// Token whitelist offered in flows. Exactly one entry is marked
    /// `native`, the chain's gas token.
    pub tokens: Vec<TokenConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Node REST endpoint settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Base URL of the node's REST API.
    pub rest_url: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Chain identifier included in signed transactions.
    pub chain_id: u8,

    /// Fund freshly registered accounts from the node faucet.
    pub faucet_funding: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            rest_url: "https://rpc-testnet.supra.com/".to_string(),
            request_timeout_secs: 10,
            chain_id: 6,
            faucet_funding: true,
        }
    }
}

/// Raw-transaction envelope parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// Gas ceiling per transaction.
    pub max_gas_amount: u64,

    /// Price per gas unit, in native subunits.
    pub gas_unit_price: u64,

    /// Transaction lifetime; expiration = now + this.
    pub expiration_secs: u64,

    /// Block on confirmation after submission.
    pub wait_for_confirmation: bool,

    /// Overall confirmation wait budget in seconds.
    pub confirmation_timeout_secs: u64,

    /// Poll interval while waiting for confirmation.
    pub confirmation_poll_secs: u64,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            max_gas_amount: 500_000,
            gas_unit_price: 100,
            expiration_secs: 300,
            wait_for_confirmation: true,
            confirmation_timeout_secs: 60,
            confirmation_poll_secs: 2,
        }
    }
}

/// Swap-quote service and on-chain router module.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SwapConfig {
    /// Quote service endpoint.
    pub quote_url: String,

    /// Quote request timeout in seconds.
    pub quote_timeout_secs: u64,

    /// Address of the swap router module.
    pub router_address: String,

    /// Router module name.
    pub router_module: String,

    /// Router entry function invoked per swap.
    pub router_function: String,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            quote_url: "https://quotes.dexlyn.com/api/v1/quote".to_string(),
            quote_timeout_secs: 10,
            router_address: "0x8ede5b689d5ac487c3ee48ceabe28ae061be74071c86ffe523b7f42acda2fcb7"
                .to_string(),
            router_module: "router".to_string(),
            router_function: "swap_exact_in".to_string(),
        }
    }
}

/// Faucet claim settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FaucetConfig {
    /// Address hosting the faucet module.
    pub module_address: String,

    /// Faucet module name.
    pub module_name: String,

    /// Claim entry function.
    pub function_name: String,

    /// Per-(user, token) cooldown window in seconds.
    pub cooldown_secs: u64,
}

impl Default for FaucetConfig {
    fn default() -> Self {
        Self {
            module_address: "0x8ede5b689d5ac487c3ee48ceabe28ae061be74071c86ffe523b7f42acda2fcb7"
                .to_string(),
            module_name: "faucet".to_string(),
            function_name: "claim".to_string(),
            cooldown_secs: 3600,
        }
    }
}

/// One whitelisted token.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
    /// Human-readable name.
    pub name: String,

    /// Short symbol shown in flows and keyboards.
    pub symbol: String,

    /// On-chain coin type tag.
    pub type_tag: String,

    /// Decimal places for amount scaling.
    pub decimals: u8,

    /// Whether this is the chain's native gas token.
    #[serde(default)]
    pub native: bool,
}

/// Default whitelist: the native coin plus the four test tokens.
pub fn default_tokens() -> Vec<TokenConfig> {
    const TEST_MODULE: &str =
        "0x8ede5b689d5ac487c3ee48ceabe28ae061be74071c86ffe523b7f42acda2fcb7";
    vec![
        TokenConfig {
            name: "Supra Coin".to_string(),
            symbol: "SUPRA".to_string(),
            type_tag: "0x1::supra_coin::SupraCoin".to_string(),
            decimals: 8,
            native: true,
        },
        TokenConfig {
            name: "tUSDC".to_string(),
            symbol: "tUSDC".to_string(),
            type_tag: format!("{TEST_MODULE}::test_usdc::TestUSDC"),
            decimals: 6,
            native: false,
        },
        TokenConfig {
            name: "tUSDT".to_string(),
            symbol: "tUSDT".to_string(),
            type_tag: format!("{TEST_MODULE}::test_usdt::TestUSDT"),
            decimals: 6,
            native: false,
        },
        TokenConfig {
            name: "tETH".to_string(),
            symbol: "tETH".to_string(),
            type_tag: format!("{TEST_MODULE}::test_eth::TestETH"),
            decimals: 18,
            native: false,
        },
        TokenConfig {
            name: "tBTC".to_string(),
            symbol: "tBTC".to_string(),
            type_tag: format!("{TEST_MODULE}::test_btc::TestBTC"),
            decimals: 8,
            native: false,
        },
    ]
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Expose Prometheus metrics.
    pub metrics_enabled: bool,

    /// Metrics listener address.
    pub metrics_address: String,

    /// Default tracing filter when RUST_LOG is unset.
    pub log_filter: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9091".to_string(),
            log_filter: "wallet_gateway=debug".to_string(),
        }
    }
}

impl GatewayConfig {
    /// Config with the default token whitelist filled in.
    pub fn with_default_tokens() -> Self {
        Self {
            tokens: default_tokens(),
            ..Self::default()
        }
    }

    /// Look up a whitelisted token by symbol.
    pub fn token(&self, symbol: &str) -> Option<&TokenConfig> {
        self.tokens.iter().find(|t| t.symbol == symbol)
    }

    /// The chain's native gas token, if configured.
    pub fn native_token(&self) -> Option<&TokenConfig> {
        self.tokens.iter().find(|t| t.native)
    }
}
