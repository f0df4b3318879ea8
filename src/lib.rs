//! Conversational wallet gateway library.

pub mod accounts;
pub mod chat;
pub mod config;
pub mod faucet;
pub mod gateway;
pub mod marshal;
pub mod node;
pub mod observability;
pub mod session;
pub mod swap;
pub mod txn;

pub use chat::Router;
pub use config::GatewayConfig;
pub use gateway::Gateway;
