//! Gateway-level error aggregation.

use thiserror::Error;

use crate::accounts::RegistryError;
use crate::faucet::FaucetError;
use crate::node::NodeError;
use crate::session::SessionError;
use crate::swap::SwapError;
use crate::txn::DispatchError;

/// Every failure the gateway surfaces to the chat layer.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Operation needs an account the user has not registered yet.
    #[error("please register an account first")]
    NotRegistered,

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Faucet(#[from] FaucetError),

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Swap(#[from] SwapError),
}

impl GatewayError {
    /// Whether this failure aborts the in-flight flow.
    ///
    /// Validation and conflict errors leave the session where it is so
    /// the user can re-prompt; marshalling, node, and dispatch failures
    /// force the flow back to Idle rather than risk a double submission.
    pub fn resets_flow(&self) -> bool {
        match self {
            GatewayError::NotRegistered
            | GatewayError::Registry(_)
            | GatewayError::Session(_) => false,
            GatewayError::Faucet(e) => !matches!(
                e,
                FaucetError::CooldownActive { .. } | FaucetError::UnknownToken(_)
            ),
            GatewayError::Node(_) | GatewayError::Dispatch(_) | GatewayError::Swap(_) => true,
        }
    }
}
