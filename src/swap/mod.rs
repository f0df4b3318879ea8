//! Swap subsystem.
//!
//! # Data Flow
//! ```text
//! completed swap flow payload
//!     → service.rs (balance pre-check)
//!     → quote.rs (quote service → type args + loose value args)
//!     → marshal (tagging + encoding)
//!     → txn::dispatcher (router entry function)
//! ```

pub mod quote;
pub mod service;

use thiserror::Error;

use crate::marshal::MarshalError;
use crate::node::NodeError;
use crate::txn::DispatchError;

pub use quote::{QuoteClient, QuoteRequest, QuoteResponse};
pub use service::SwapService;

/// Failures along the swap path.
#[derive(Debug, Error)]
pub enum SwapError {
    /// Pre-submission check failed; nothing was sent anywhere.
    #[error("insufficient {symbol} balance: have {available}, need {required}")]
    InsufficientBalance {
        symbol: String,
        available: u128,
        required: u128,
    },

    #[error("'{0}' is not a supported token")]
    UnknownToken(String),

    #[error("swap quote service unavailable: {0}")]
    QuoteUnavailable(String),

    #[error("invalid swap router address: {0}")]
    BadRouterAddress(String),

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error(transparent)]
    Marshal(#[from] MarshalError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
