//! Conversational Wallet Gateway
//!
//! A chat-driven wallet for a Move-style chain, built on Tokio.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                WALLET GATEWAY                │
//!                        │                                              │
//!   (user, text/button)  │  ┌────────┐   ┌──────────┐   ┌───────────┐  │
//!   ────────────────────▶│  │  chat  │──▶│ session  │──▶│  gateway  │  │
//!                        │  │ router │   │ machine  │   │  service  │  │
//!                        │  └────────┘   └──────────┘   └─────┬─────┘  │
//!                        │                                    │        │
//!                        │             ┌──────────────────────┼──────┐ │
//!                        │             ▼                      ▼      │ │
//!                        │      ┌────────────┐         ┌──────────┐  │ │
//!                        │      │  marshal   │         │  faucet  │  │ │
//!                        │      │ args+tags  │         │  + swap  │  │ │
//!                        │      └─────┬──────┘         └────┬─────┘  │ │
//!                        │            ▼                     ▼        │ │
//!   reply + keyboards    │      ┌────────────┐         ┌──────────┐  │ │
//!   ◀────────────────────│      │    txn     │────────▶│   node   │──┼─┼──▶ chain
//!                        │      │ dispatcher │         │  client  │  │ │
//!                        │      └────────────┘         └──────────┘  │ │
//!                        │                                           │ │
//!                        │  config / observability / accounts ───────┘ │
//!                        └──────────────────────────────────────────────┘
//! ```
//!
//! The binary wires a line-based transport on stdin for local use:
//! `<user id> <text>` sends message text, `<user id> :<token>` presses
//! the option with that token.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use wallet_gateway::accounts::DevKeyProvider;
use wallet_gateway::chat::{ChatEvent, Reply, Router};
use wallet_gateway::config::loader::load_config;
use wallet_gateway::config::GatewayConfig;
use wallet_gateway::node::HttpNodeClient;
use wallet_gateway::observability::{logging, metrics};
use wallet_gateway::Gateway;

#[derive(Parser)]
#[command(name = "wallet-gateway")]
#[command(about = "Conversational wallet gateway", long_about = None)]
struct Cli {
    /// Path to a TOML config; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable the Prometheus exporter even if the config leaves it off.
    #[arg(long)]
    metrics: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::with_default_tokens(),
    };

    logging::init_logging(&config.observability.log_filter);
    tracing::info!("wallet-gateway v0.1.0 starting");

    tracing::info!(
        node_url = %config.node.rest_url,
        tokens = config.tokens.len(),
        cooldown_secs = config.faucet.cooldown_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled || cli.metrics {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let config = Arc::new(config);
    let node = Arc::new(HttpNodeClient::new(&config.node)?);
    let keys = Arc::new(DevKeyProvider::new());
    let gateway = Gateway::new(config, node, keys);
    let router = Router::new(gateway);

    run_stdin_transport(router).await;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Minimal local transport: one event per stdin line.
async fn run_stdin_transport(router: Router) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("wallet-gateway ready. Lines: '<user id> <text>' or '<user id> :<option token>'.");

    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some((id_part, rest)) = line.split_once(' ') else {
            println!("expected '<user id> <input>'");
            continue;
        };
        let Ok(user_id) = id_part.parse::<u64>() else {
            println!("'{id_part}' is not a numeric user id");
            continue;
        };

        let event = match rest.strip_prefix(':') {
            Some(token) => ChatEvent::selection(user_id, token),
            None => ChatEvent::text(user_id, rest),
        };

        let reply = router.handle_event(event).await;
        print_reply(&reply);
    }
}

fn print_reply(reply: &Reply) {
    println!("{}", reply.text);
    for choice in &reply.options {
        println!("  [{}] -> :{}", choice.label, choice.token);
    }
}
