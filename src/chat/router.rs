//! Event routing with per-user serialization.
//!
//! # Responsibilities
//! - Hold each user's event lock: two rapid messages from one user are
//!   processed one after the other, never interleaved
//! - Translate commands and selection tokens into gateway operations
//! - Turn gateway outcomes and errors into reply text and keyboards
//!
//! Users are independent; events for different users run in parallel.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::Instrument;
use uuid::Uuid;

use crate::chat::{ChatEvent, Choice, Incoming, Reply};
use crate::gateway::{FlowOutcome, Gateway, GatewayError};
use crate::observability::metrics;
use crate::session::{FlowKind, SessionState};

const MENU_TEXT: &str = "Welcome to the wallet gateway!\nWhat would you like to do?";
const NO_FLOW_HINT: &str = "No flow in progress. Send /start to see what you can do.";

/// Dispatches chat events into the gateway under a per-user lock.
#[derive(Clone)]
pub struct Router {
    gateway: Gateway,
    locks: Arc<DashMap<u64, Arc<Mutex<()>>>>,
}

impl Router {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Handle one event to completion. Never fails: every error becomes
    /// reply text for the user.
    pub async fn handle_event(&self, event: ChatEvent) -> Reply {
        let lock = self
            .locks
            .entry(event.user_id)
            .or_default()
            .value()
            .clone();

        // Held across all awaits below: everything touching this user's
        // session, account, or cooldowns is serialized here.
        let _guard = lock.lock().await;

        let span = tracing::info_span!(
            "chat_event",
            user_id = event.user_id,
            event_id = %Uuid::new_v4()
        );
        self.dispatch(event).instrument(span).await
    }

    async fn dispatch(&self, event: ChatEvent) -> Reply {
        let user_id = event.user_id;
        match event.input {
            Incoming::Text(text) => {
                let text = text.trim().to_string();
                metrics::record_event("text");
                if text == "/start" || text == "/menu" {
                    return self.menu();
                }
                if text == "/cancel" {
                    self.gateway.sessions().reset(user_id);
                    return Reply::text_only("Flow cancelled.");
                }
                self.advance(user_id, &text).await
            }
            Incoming::Selection(token) => {
                metrics::record_event("selection");
                self.select(user_id, &token).await
            }
        }
    }

    async fn select(&self, user_id: u64, token: &str) -> Reply {
        match token {
            "register" => self.register(user_id).await,
            "balance" => self.balance(user_id).await,
            "send" => self.begin(user_id, FlowKind::Send),
            "swap" => self.begin(user_id, FlowKind::Swap),
            "faucet" => self.faucet_menu(user_id),
            _ => {
                if let Some(symbol) = token.strip_prefix("swap_from_") {
                    return self.advance(user_id, symbol).await;
                }
                if let Some(symbol) = token.strip_prefix("swap_to_") {
                    return self.advance(user_id, symbol).await;
                }
                if let Some(symbol) = token.strip_prefix("faucet_") {
                    return self.claim(user_id, symbol).await;
                }
                Reply::text_only(format!("Unknown action '{token}'."))
            }
        }
    }

    fn menu(&self) -> Reply {
        Reply::with_options(
            MENU_TEXT,
            vec![
                Choice::new("Register New Account", "register"),
                Choice::new("Check Balance", "balance"),
                Choice::new("Send", "send"),
                Choice::new("Swap", "swap"),
                Choice::new("Faucet", "faucet"),
            ],
        )
    }

    async fn register(&self, user_id: u64) -> Reply {
        match self.gateway.register_user(user_id).await {
            Ok(summary) => Reply::text_only(format!(
                "Account created successfully!\nYour address: {}\nYour key is held by the gateway's signer.",
                summary.address
            )),
            Err(e) => self.error_reply(user_id, e),
        }
    }

    async fn balance(&self, user_id: u64) -> Reply {
        match self.gateway.account_summary(user_id).await {
            Ok(summary) => {
                let mut lines = vec!["Your balances:".to_string(), String::new()];
                for balance in &summary.balances {
                    lines.push(format!(
                        "{} ({}): {}",
                        balance.name, balance.symbol, balance.display
                    ));
                }
                Reply::text_only(lines.join("\n"))
            }
            Err(e) => self.error_reply(user_id, e),
        }
    }

    fn begin(&self, user_id: u64, flow: FlowKind) -> Reply {
        match self.gateway.begin_flow(user_id, flow) {
            Ok(state) => self.prompt_for(&state),
            Err(e) => self.error_reply(user_id, e),
        }
    }

    fn faucet_menu(&self, user_id: u64) -> Reply {
        if !self.gateway.is_registered(user_id) {
            return Reply::text_only("Please register an account first!");
        }
        let options = self
            .gateway
            .faucet_statuses(user_id)
            .into_iter()
            .map(|(symbol, remaining)| {
                Choice::new(format!("{symbol} ({remaining})"), format!("faucet_{symbol}"))
            })
            .collect();
        Reply::with_options("Select a token to claim from the faucet:", options)
    }

    async fn claim(&self, user_id: u64, symbol: &str) -> Reply {
        match self.gateway.claim_faucet(user_id, symbol).await {
            Ok(hash) => Reply::text_only(format!(
                "Faucet claim submitted!\nTransaction hash: {hash}"
            )),
            Err(e) => self.error_reply(user_id, e),
        }
    }

    async fn advance(&self, user_id: u64, input: &str) -> Reply {
        if !self.gateway.is_registered(user_id) {
            return Reply::text_only("Please register an account first!");
        }
        if self.gateway.sessions().state(user_id).is_idle() {
            return Reply::text_only(NO_FLOW_HINT);
        }
        match self.gateway.advance_flow(user_id, input).await {
            Ok(FlowOutcome::Prompt(state)) => self.prompt_for(&state),
            Ok(FlowOutcome::Submitted { intent, tx_hash }) => Reply::text_only(format!(
                "{} submitted successfully!\nTransaction hash: {tx_hash}",
                match intent {
                    FlowKind::Send => "Transfer",
                    FlowKind::Swap => "Swap",
                }
            )),
            Err(e) => self.error_reply(user_id, e),
        }
    }

    /// Prompt (and keyboard, where the step is a selection) for a state.
    fn prompt_for(&self, state: &SessionState) -> Reply {
        match state {
            SessionState::Idle => Reply::text_only(NO_FLOW_HINT),
            SessionState::AwaitingRecipient => {
                Reply::text_only("Please send the recipient's address:")
            }
            SessionState::AwaitingAmount { .. } => {
                Reply::text_only("Please enter the amount to send:")
            }
            SessionState::SwapSelectFrom => Reply::with_options(
                "Select the token you want to swap from:",
                self.gateway
                    .sessions()
                    .all_symbols()
                    .into_iter()
                    .map(|s| Choice::new(s.clone(), format!("swap_from_{s}")))
                    .collect(),
            ),
            SessionState::SwapSelectTo { from_token } => Reply::with_options(
                "Select the token you want to swap to:",
                // The chosen "from" token is never offered back.
                self.gateway
                    .sessions()
                    .to_candidates(from_token)
                    .into_iter()
                    .map(|s| Choice::new(s.clone(), format!("swap_to_{s}")))
                    .collect(),
            ),
            SessionState::SwapAwaitingAmount { from_token, .. } => {
                Reply::text_only(format!("Enter the amount of {from_token} to swap:"))
            }
        }
    }

    fn error_reply(&self, user_id: u64, error: GatewayError) -> Reply {
        if matches!(
            error,
            GatewayError::Session(crate::session::SessionError::Validation(_))
        ) {
            metrics::record_validation_failure("advance");
        }
        tracing::debug!(user_id, error = %error, "Replying with error");
        Reply::text_only(format!("Error: {error}"))
    }
}
