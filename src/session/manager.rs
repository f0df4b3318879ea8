//! Per-user session table with begin/advance/reset semantics.

use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;

use crate::accounts::AccountAddress;
use crate::config::TokenConfig;
use crate::session::state::{parse_amount, FlowKind, FlowPayload, SessionState};

/// Session-level errors. Validation failures never mutate state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Input did not match the current step's expected shape.
    #[error("{0}")]
    Validation(String),

    /// A different flow is already in progress for this user.
    #[error("a {active} flow is already in progress, finish or cancel it first")]
    Conflict { active: &'static str },
}

/// Result of advancing a flow one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// The flow moved to this state; prompt the user accordingly.
    Next(SessionState),
    /// The flow finished; the session is back at `Idle` and the payload
    /// is ready for execution.
    Complete(FlowPayload),
}

/// Owns every user's `SessionState`. All mutation goes through
/// `begin`/`advance`/`reset`; individual operations are atomic on the
/// user's map entry, and the chat router serializes whole events per
/// user on top of this.
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<DashMap<u64, SessionState>>,
    tokens: Arc<Vec<TokenConfig>>,
}

impl SessionManager {
    pub fn new(tokens: Arc<Vec<TokenConfig>>) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            tokens,
        }
    }

    /// Current state for a user, `Idle` if never seen.
    pub fn state(&self, user_id: u64) -> SessionState {
        self.sessions
            .get(&user_id)
            .map(|r| r.value().clone())
            .unwrap_or_default()
    }

    /// Start a flow at its first step.
    ///
    /// Beginning while a *different* family is active is a conflict.
    /// Re-beginning the same family restarts it from step one, so a
    /// user who presses "Send" twice just gets re-prompted.
    pub fn begin(&self, user_id: u64, flow: FlowKind) -> Result<SessionState, SessionError> {
        let mut entry = self.sessions.entry(user_id).or_default();
        if let Some(active) = entry.value().flow() {
            if active != flow {
                return Err(SessionError::Conflict {
                    active: active.name(),
                });
            }
        }
        let initial = match flow {
            FlowKind::Send => SessionState::AwaitingRecipient,
            FlowKind::Swap => SessionState::SwapSelectFrom,
        };
        *entry.value_mut() = initial.clone();
        Ok(initial)
    }

    /// Feed one user input (free text or a selection symbol) to the
    /// active flow. On validation failure the state is unchanged.
    pub fn advance(&self, user_id: u64, input: &str) -> Result<Advance, SessionError> {
        let mut entry = self.sessions.entry(user_id).or_default();
        let next = self.step(entry.value(), input)?;
        match next {
            Advance::Next(ref state) => *entry.value_mut() = state.clone(),
            // Completion resets to Idle; a straggling second message
            // gets "no flow in progress" rather than a double-submit.
            Advance::Complete(_) => *entry.value_mut() = SessionState::Idle,
        }
        Ok(next)
    }

    /// Force a user back to `Idle` (flow abandoned or aborted by a
    /// downstream failure).
    pub fn reset(&self, user_id: u64) {
        if let Some(mut entry) = self.sessions.get_mut(&user_id) {
            *entry.value_mut() = SessionState::Idle;
        }
    }

    /// Pure transition function: current state + input → outcome.
    fn step(&self, state: &SessionState, input: &str) -> Result<Advance, SessionError> {
        let input = input.trim();
        match state {
            SessionState::Idle => Err(SessionError::Validation(
                "no flow in progress".to_string(),
            )),

            SessionState::AwaitingRecipient => {
                let recipient = AccountAddress::from_hex_literal(input).map_err(|e| {
                    SessionError::Validation(format!(
                        "expected a 0x-prefixed recipient address: {}",
                        e.reason
                    ))
                })?;
                Ok(Advance::Next(SessionState::AwaitingAmount { recipient }))
            }

            SessionState::AwaitingAmount { recipient } => {
                let decimals = self.native_decimals();
                let amount =
                    parse_amount(input, decimals).map_err(SessionError::Validation)?;
                Ok(Advance::Complete(FlowPayload::Send {
                    recipient: *recipient,
                    amount,
                }))
            }

            SessionState::SwapSelectFrom => {
                let token = self.require_token(input)?;
                Ok(Advance::Next(SessionState::SwapSelectTo {
                    from_token: token.symbol.clone(),
                }))
            }

            SessionState::SwapSelectTo { from_token } => {
                let token = self.require_token(input)?;
                if token.symbol == *from_token {
                    return Err(SessionError::Validation(format!(
                        "cannot swap {from_token} for itself"
                    )));
                }
                Ok(Advance::Next(SessionState::SwapAwaitingAmount {
                    from_token: from_token.clone(),
                    to_token: token.symbol.clone(),
                }))
            }

            SessionState::SwapAwaitingAmount {
                from_token,
                to_token,
            } => {
                let decimals = self
                    .token(from_token)
                    .map(|t| t.decimals)
                    .unwrap_or_else(|| self.native_decimals());
                let amount =
                    parse_amount(input, decimals).map_err(SessionError::Validation)?;
                Ok(Advance::Complete(FlowPayload::Swap {
                    from_token: from_token.clone(),
                    to_token: to_token.clone(),
                    amount,
                }))
            }
        }
    }

    /// Valid "to" choices for a swap: the whitelist minus the chosen
    /// "from" token. The excluded symbol is never offered, not merely
    /// rejected after selection.
    pub fn to_candidates(&self, from_token: &str) -> Vec<String> {
        self.tokens
            .iter()
            .filter(|t| t.symbol != from_token)
            .map(|t| t.symbol.clone())
            .collect()
    }

    /// Every whitelisted symbol, for the "from" keyboard.
    pub fn all_symbols(&self) -> Vec<String> {
        self.tokens.iter().map(|t| t.symbol.clone()).collect()
    }

    fn token(&self, symbol: &str) -> Option<&TokenConfig> {
        self.tokens.iter().find(|t| t.symbol == symbol)
    }

    fn require_token(&self, symbol: &str) -> Result<&TokenConfig, SessionError> {
        self.token(symbol).ok_or_else(|| {
            SessionError::Validation(format!(
                "'{symbol}' is not a supported token, choose one of: {}",
                self.all_symbols().join(", ")
            ))
        })
    }

    fn native_decimals(&self) -> u8 {
        self.tokens
            .iter()
            .find(|t| t.native)
            .map(|t| t.decimals)
            .unwrap_or(8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::default_tokens;

    fn manager() -> SessionManager {
        SessionManager::new(Arc::new(default_tokens()))
    }

    const RECIPIENT: &str = "0x0102030405060708091011121314151617181920212223242526272829303132";

    #[test]
    fn send_flow_yields_scaled_payload() {
        let m = manager();
        assert_eq!(m.begin(1, FlowKind::Send).unwrap(), SessionState::AwaitingRecipient);

        let next = m.advance(1, RECIPIENT).unwrap();
        assert!(matches!(next, Advance::Next(SessionState::AwaitingAmount { .. })));

        match m.advance(1, "5").unwrap() {
            Advance::Complete(FlowPayload::Send { recipient, amount }) => {
                assert_eq!(recipient.to_string(), RECIPIENT);
                // 5 native units at 8 decimals.
                assert_eq!(amount, 500_000_000);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        // Flow is complete; the session is Idle again.
        assert!(m.state(1).is_idle());
        let err = m.advance(1, "5").unwrap_err();
        assert_eq!(err, SessionError::Validation("no flow in progress".to_string()));
    }

    #[test]
    fn swap_flow_collects_tokens_and_amount() {
        let m = manager();
        m.begin(2, FlowKind::Swap).unwrap();
        m.advance(2, "tUSDC").unwrap();
        m.advance(2, "tETH").unwrap();

        match m.advance(2, "1.5").unwrap() {
            Advance::Complete(FlowPayload::Swap {
                from_token,
                to_token,
                amount,
            }) => {
                assert_eq!(from_token, "tUSDC");
                assert_eq!(to_token, "tETH");
                // Scaled by the *from* token's 6 decimals.
                assert_eq!(amount, 1_500_000);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn invalid_input_never_mutates_state() {
        let m = manager();
        m.begin(3, FlowKind::Send).unwrap();

        assert!(m.advance(3, "not-an-address").is_err());
        assert_eq!(m.state(3), SessionState::AwaitingRecipient);

        m.advance(3, RECIPIENT).unwrap();
        for bad in ["0", "-4", "abc", ""] {
            assert!(m.advance(3, bad).is_err(), "{bad:?} should fail");
            assert!(matches!(m.state(3), SessionState::AwaitingAmount { .. }));
        }
    }

    #[test]
    fn different_flow_family_conflicts_same_family_restarts() {
        let m = manager();
        m.begin(4, FlowKind::Send).unwrap();
        let err = m.begin(4, FlowKind::Swap).unwrap_err();
        assert_eq!(err, SessionError::Conflict { active: "send" });

        // Mid-flow re-begin of the same family restarts at step one.
        m.advance(4, RECIPIENT).unwrap();
        assert_eq!(m.begin(4, FlowKind::Send).unwrap(), SessionState::AwaitingRecipient);
        assert_eq!(m.state(4), SessionState::AwaitingRecipient);
    }

    #[test]
    fn swap_to_self_is_rejected_and_never_offered() {
        let m = manager();
        m.begin(5, FlowKind::Swap).unwrap();
        m.advance(5, "tUSDC").unwrap();

        let candidates = m.to_candidates("tUSDC");
        assert!(!candidates.contains(&"tUSDC".to_string()));
        assert_eq!(candidates.len(), 4);

        let err = m.advance(5, "tUSDC").unwrap_err();
        assert!(err.to_string().contains("itself"));
        assert_eq!(
            m.state(5),
            SessionState::SwapSelectTo {
                from_token: "tUSDC".to_string()
            }
        );
    }

    #[test]
    fn unknown_token_names_the_whitelist() {
        let m = manager();
        m.begin(6, FlowKind::Swap).unwrap();
        let err = m.advance(6, "DOGE").unwrap_err();
        assert!(err.to_string().contains("tUSDC"));
        assert_eq!(m.state(6), SessionState::SwapSelectFrom);
    }

    #[test]
    fn reset_forces_idle() {
        let m = manager();
        m.begin(7, FlowKind::Swap).unwrap();
        m.reset(7);
        assert!(m.state(7).is_idle());
    }
}
