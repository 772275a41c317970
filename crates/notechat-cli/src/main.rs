//! Notechat -- terminal chat over a ledger's transaction notes.
//!
//! Usage:
//!
//!   notechat [OPTIONS]
//!
//! Options:
//!
//!   --chat-addr <ADDR>       Shared chat account address
//!   --ledger-url <URL>       Ledger node REST endpoint
//!   --ledger-token <TOKEN>   Ledger node API token
//!   --custody-url <URL>      Key-custody service REST endpoint
//!   --custody-token <TOKEN>  Key-custody service API token
//!   --wallet <NAME>          Wallet name that pays the fees
//!   --password <PASS>        Wallet password
//!   --from <ADDR>            Address inside the wallet to send from
//!   --username <NAME>        Display name for outgoing messages
//!   --lookback <ROUNDS>      Historical rounds scanned at startup
//!   --config <PATH>          Load config from JSON file
//!
//! Environment:
//!
//!   NOTECHAT_WALLET_PASSWORD  Wallet password (avoids the CLI flag)
//!
//! Typed lines are sent to the chat; inbound messages and send status
//! updates are printed as they arrive. Runs until Ctrl+C.

use tokio::io::{AsyncBufReadExt, BufReader};

use notechat_client::{CustodyClient, NodeClient};
use notechat_stream::ChatStream;

mod config;

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    // Tracing / logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Parse CLI arguments.
    let cli = config::CliArgs::parse_from_env();

    // Load or merge config file if provided.
    let mut stream_config = match &cli.config_path {
        Some(path) => match config::load(path) {
            Ok(mut cfg) => {
                config::apply_cli(&mut cfg, &cli);
                cfg
            }
            Err(e) => {
                tracing::error!("failed to load config file: {e}");
                std::process::exit(1);
            }
        },
        None => config::from_cli(&cli),
    };

    // The password never has to appear on the command line.
    if stream_config.wallet_password.is_empty() {
        if let Ok(pass) = std::env::var("NOTECHAT_WALLET_PASSWORD") {
            stream_config.wallet_password = pass;
        }
    }

    if let Err(e) = run_client(stream_config).await {
        tracing::error!("client error: {e}");
        std::process::exit(1);
    }
}

// ---------------------------------------------------------------------------
// Client main logic
// ---------------------------------------------------------------------------

async fn run_client(cfg: notechat_types::config::StreamConfig) -> Result<(), String> {
    let username = cfg.username.clone();
    let chat_addr = cfg.chat_addr.clone();

    let mut stream: ChatStream<NodeClient, CustodyClient> =
        ChatStream::new(cfg).map_err(|e| format!("invalid configuration: {e}"))?;

    stream
        .init()
        .await
        .map_err(|e| format!("stream init failed: {e}"))?;

    let mut inbound = stream
        .take_inbound()
        .ok_or_else(|| "inbound queue unavailable".to_string())?;
    let mut status = stream
        .take_status()
        .ok_or_else(|| "status queue unavailable".to_string())?;
    let outbound = stream
        .outbound_sender()
        .ok_or_else(|| "outbound queue unavailable".to_string())?;

    stream.run().map_err(|e| format!("stream start failed: {e}"))?;

    println!();
    println!("============================================================");
    println!("  Notechat connected");
    println!("============================================================");
    println!("  Chat address: {chat_addr}");
    println!("  Username:     {username}");
    println!("  Type a message and press Enter to send");
    println!("  Press Ctrl+C to quit");
    println!("============================================================");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            message = inbound.recv() => {
                match message {
                    Some(message) => println!("{message}"),
                    None => {
                        tracing::error!("inbound queue closed; scanner stopped");
                        break;
                    }
                }
            }
            update = status.recv() => {
                match update {
                    Some(update) => println!("* {update}"),
                    None => {
                        tracing::error!("status queue closed; sender stopped");
                        break;
                    }
                }
            }
            line = lines.next_line() => {
                match line {
                    Ok(Some(text)) => {
                        let text = text.trim().to_string();
                        if text.is_empty() {
                            continue;
                        }
                        if outbound.send(text).await.is_err() {
                            tracing::error!("outbound queue closed; sender stopped");
                            break;
                        }
                    }
                    Ok(None) => {
                        tracing::info!("stdin closed, shutting down...");
                        break;
                    }
                    Err(e) => {
                        tracing::error!(%e, "stdin read failed");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    stream.shutdown().await;
    Ok(())
}
