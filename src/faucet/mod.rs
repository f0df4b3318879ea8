//! Faucet subsystem.
//!
//! # Data Flow
//! ```text
//! claim selection
//!     → cooldown.rs (eligibility, remaining-wait display)
//!     → claim.rs (claim transaction via the dispatcher)
//!     → cooldown recorded only after a confirmed submission
//! ```

pub mod claim;
pub mod cooldown;

pub use claim::{FaucetError, FaucetService};
pub use cooldown::{unix_now, CooldownTracker, Remaining};
