//! Conversation state machine subsystem.
//!
//! # Data Flow
//! ```text
//! chat event (text or selection)
//!     → manager.rs (begin / advance / reset, per-user table)
//!     → state.rs (tagged states, step validation, amount scaling)
//!     → FlowPayload (handed to the dispatcher on completion)
//! ```
//!
//! # Invariants
//! - One active flow per user; cross-family begin is a conflict
//! - Validation failures never mutate state
//! - Completion resets the session to Idle before the payload executes

pub mod manager;
pub mod state;

pub use manager::{Advance, SessionError, SessionManager};
pub use state::{FlowKind, FlowPayload, SessionState};
