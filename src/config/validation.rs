//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check URL well-formedness and value ranges
//! - Check token whitelist integrity (unique symbols, one native, valid tags)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::fmt;

use crate::accounts::AccountAddress;
use crate::config::schema::GatewayConfig;
use crate::marshal::TypeTag;

/// Largest decimals value whose power of ten fits in the u128 amount
/// arithmetic.
const MAX_TOKEN_DECIMALS: u8 = 38;

/// One semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut push = |field: &str, message: String| {
        errors.push(ValidationError {
            field: field.to_string(),
            message,
        });
    };

    if let Err(e) = url::Url::parse(&config.node.rest_url) {
        push("node.rest_url", format!("invalid URL: {e}"));
    }
    if config.node.request_timeout_secs == 0 {
        push("node.request_timeout_secs", "must be nonzero".to_string());
    }

    if config.transaction.max_gas_amount == 0 {
        push("transaction.max_gas_amount", "must be nonzero".to_string());
    }
    if config.transaction.expiration_secs == 0 {
        push("transaction.expiration_secs", "must be nonzero".to_string());
    }
    if config.transaction.confirmation_poll_secs == 0 {
        push(
            "transaction.confirmation_poll_secs",
            "must be nonzero".to_string(),
        );
    }

    if let Err(e) = url::Url::parse(&config.swap.quote_url) {
        push("swap.quote_url", format!("invalid URL: {e}"));
    }
    if let Err(e) = AccountAddress::from_hex_literal(&config.swap.router_address) {
        push("swap.router_address", e.reason);
    }

    if let Err(e) = AccountAddress::from_hex_literal(&config.faucet.module_address) {
        push("faucet.module_address", e.reason);
    }
    if config.faucet.cooldown_secs == 0 {
        push("faucet.cooldown_secs", "must be nonzero".to_string());
    }

    if config.tokens.is_empty() {
        push("tokens", "whitelist must not be empty".to_string());
    }
    let mut seen = HashSet::new();
    for (i, token) in config.tokens.iter().enumerate() {
        let field = format!("tokens[{i}]");
        if token.symbol.is_empty() {
            push(&field, "symbol must not be empty".to_string());
        }
        if !seen.insert(token.symbol.clone()) {
            push(&field, format!("duplicate symbol '{}'", token.symbol));
        }
        if let Err(e) = TypeTag::parse(&token.type_tag) {
            push(&field, format!("invalid type tag: {e}"));
        }
        if token.decimals > MAX_TOKEN_DECIMALS {
            push(
                &field,
                format!(
                    "decimals {} exceeds the supported maximum of {MAX_TOKEN_DECIMALS}",
                    token.decimals
                ),
            );
        }
    }
    let native_count = config.tokens.iter().filter(|t| t.native).count();
    if !config.tokens.is_empty() && native_count != 1 {
        push(
            "tokens",
            format!("exactly one native token required, found {native_count}"),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::default_tokens;

    #[test]
    fn default_config_with_tokens_is_valid() {
        let config = GatewayConfig::with_default_tokens();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_whitelist_is_rejected() {
        let config = GatewayConfig::default();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "tokens"));
    }

    #[test]
    fn collects_multiple_errors_at_once() {
        let mut config = GatewayConfig::with_default_tokens();
        config.node.rest_url = "not a url".to_string();
        config.faucet.cooldown_secs = 0;
        config.tokens[1].type_tag = "0x1::bad".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.len() >= 3, "got: {errors:?}");
        assert!(errors.iter().any(|e| e.field == "node.rest_url"));
        assert!(errors.iter().any(|e| e.field == "faucet.cooldown_secs"));
        assert!(errors.iter().any(|e| e.field == "tokens[1]"));
    }

    #[test]
    fn oversized_decimals_are_rejected() {
        let mut config = GatewayConfig::with_default_tokens();
        config.tokens[1].decimals = 40;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.field == "tokens[1]" && e.message.contains("decimals")));
    }

    #[test]
    fn duplicate_symbols_and_multiple_natives_are_rejected() {
        let mut config = GatewayConfig::default();
        config.tokens = default_tokens();
        config.tokens[2].symbol = "tUSDC".to_string();
        config.tokens[3].native = true;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.message.contains("duplicate")));
        assert!(errors.iter().any(|e| e.message.contains("native")));
    }
}
