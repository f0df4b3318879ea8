//! Argument marshalling subsystem.
//!
//! # Data Flow
//! ```text
//! flow payload / swap-quote JSON
//!     → args.rs (tagged TxArg, byte encoding, ULEB128 prefixes)
//!     → type_tag.rs (type-tag grammar → structured tags → binary form)
//!     → txn::request (raw transaction envelope)
//! ```

pub mod args;
pub mod type_tag;

pub use args::{uleb128, EncodedArgument, MarshalError, TxArg};
pub use type_tag::{StructTag, TypeTag, TypeTagParseError};
