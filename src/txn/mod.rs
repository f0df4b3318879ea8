//! Transaction building and submission subsystem.
//!
//! # Data Flow
//! ```text
//! FlowPayload / swap quote
//!     → request.rs (TransactionRequest → RawTransaction envelope)
//!     → dispatcher.rs (sequence lookup, marshal, sign, submit, confirm)
//!     → TxHash or a typed DispatchError
//! ```

pub mod dispatcher;
pub mod request;

pub use dispatcher::{DispatchError, Dispatcher};
pub use request::{RawTransaction, TransactionRequest};
