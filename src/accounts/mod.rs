//! Account ownership subsystem.
//!
//! # Data Flow
//! ```text
//! registration request
//!     → keys.rs (generate key pair behind an opaque handle)
//!     → registry.rs (user id → Account, at most one per user)
//!     → txn::dispatcher (signing via the same handle)
//! ```
//!
//! # Security Constraints
//! - Key material never crosses this module's boundary
//! - Accounts are immutable after registration and never migrate users

pub mod address;
pub mod keys;
pub mod registry;

pub use address::{AccountAddress, AddressParseError};
pub use keys::{DevKeyProvider, KeyError, KeyHandle, KeyProvider, SignedTransaction};
pub use registry::{Account, AccountRegistry, RegistryError};
