//! Chain access boundary.
//!
//! The rest of the crate talks to the chain exclusively through the
//! `NodeClient` trait; `HttpNodeClient` wires it to a real node's REST
//! API with per-request timeouts.

pub mod client;

pub use client::{HttpNodeClient, NodeClient, NodeError, TxHash, TxStatus};
