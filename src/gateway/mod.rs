//! The gateway core: operations exposed to the chat layer.
//!
//! # Data Flow
//! ```text
//! chat router
//!     → service.rs (register / summary / begin / advance / claim)
//!     → session, faucet, swap, txn subsystems
//!     → error.rs (typed failures + flow-reset policy)
//! ```

pub mod error;
pub mod service;

pub use error::GatewayError;
pub use service::{AccountSummary, FlowOutcome, Gateway, TokenBalance};
