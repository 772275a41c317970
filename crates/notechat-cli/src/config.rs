//! CLI argument parsing and config file support.
//!
//! The client can be configured via CLI flags, a JSON config file,
//! or a combination of both (CLI overrides config file).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use notechat_types::config::StreamConfig;

// ---------------------------------------------------------------------------
// CLI arguments (manual parsing, no clap dependency)
// ---------------------------------------------------------------------------

/// Parsed command-line arguments.
pub struct CliArgs {
    pub chat_addr: Option<String>,
    pub ledger_url: Option<String>,
    pub ledger_token: Option<String>,
    pub custody_url: Option<String>,
    pub custody_token: Option<String>,
    pub wallet_name: Option<String>,
    pub wallet_password: Option<String>,
    pub from_addr: Option<String>,
    pub username: Option<String>,
    pub lookback_rounds: Option<u64>,
    pub config_path: Option<PathBuf>,
}

impl CliArgs {
    /// Parses CLI arguments from `std::env::args`.
    pub fn parse_from_env() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let mut cli = Self {
            chat_addr: None,
            ledger_url: None,
            ledger_token: None,
            custody_url: None,
            custody_token: None,
            wallet_name: None,
            wallet_password: None,
            from_addr: None,
            username: None,
            lookback_rounds: None,
            config_path: None,
        };

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--chat-addr" => {
                    i += 1;
                    cli.chat_addr = args.get(i).cloned();
                }
                "--ledger-url" => {
                    i += 1;
                    cli.ledger_url = args.get(i).cloned();
                }
                "--ledger-token" => {
                    i += 1;
                    cli.ledger_token = args.get(i).cloned();
                }
                "--custody-url" => {
                    i += 1;
                    cli.custody_url = args.get(i).cloned();
                }
                "--custody-token" => {
                    i += 1;
                    cli.custody_token = args.get(i).cloned();
                }
                "--wallet" => {
                    i += 1;
                    cli.wallet_name = args.get(i).cloned();
                }
                "--password" => {
                    i += 1;
                    cli.wallet_password = args.get(i).cloned();
                }
                "--from" => {
                    i += 1;
                    cli.from_addr = args.get(i).cloned();
                }
                "--username" => {
                    i += 1;
                    cli.username = args.get(i).cloned();
                }
                "--lookback" => {
                    i += 1;
                    cli.lookback_rounds = args.get(i).and_then(|s| s.parse().ok());
                }
                "--config" => {
                    i += 1;
                    cli.config_path = args.get(i).map(PathBuf::from);
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                other => {
                    eprintln!("unknown argument: {other}");
                    eprintln!("use --help for usage information");
                    std::process::exit(1);
                }
            }
            i += 1;
        }

        cli
    }
}

// ---------------------------------------------------------------------------
// Config file (JSON)
// ---------------------------------------------------------------------------

/// JSON config file format.
///
/// Example `notechat.json`:
/// ```json
/// {
///   "ledger_url": "http://localhost:8080",
///   "ledger_token": "aaaa...",
///   "custody_url": "http://localhost:7833",
///   "custody_token": "bbbb...",
///   "wallet_name": "unencrypted-default-wallet",
///   "from_addr": "KPLD4GPZ...",
///   "username": "alice"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientConfigFile {
    pub chat_addr: Option<String>,
    pub ledger_url: Option<String>,
    pub ledger_token: Option<String>,
    pub custody_url: Option<String>,
    pub custody_token: Option<String>,
    pub wallet_name: Option<String>,
    pub wallet_password: Option<String>,
    pub from_addr: Option<String>,
    pub username: Option<String>,
    pub lookback_rounds: Option<u64>,
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Builds a stream config purely from CLI args with defaults.
pub fn from_cli(cli: &CliArgs) -> StreamConfig {
    let mut config = StreamConfig::default();
    apply_cli(&mut config, cli);
    config
}

/// Loads a stream config from a JSON file.
pub fn load(path: &Path) -> Result<StreamConfig, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read config file: {e}"))?;

    let file: ClientConfigFile =
        serde_json::from_str(&text).map_err(|e| format!("invalid config JSON: {e}"))?;

    let mut config = StreamConfig::default();
    if let Some(v) = file.chat_addr {
        config.chat_addr = v;
    }
    if let Some(v) = file.ledger_url {
        config.ledger_url = v;
    }
    if let Some(v) = file.ledger_token {
        config.ledger_token = v;
    }
    if let Some(v) = file.custody_url {
        config.custody_url = v;
    }
    if let Some(v) = file.custody_token {
        config.custody_token = v;
    }
    if let Some(v) = file.wallet_name {
        config.wallet_name = v;
    }
    if let Some(v) = file.wallet_password {
        config.wallet_password = v;
    }
    if let Some(v) = file.from_addr {
        config.from_addr = v;
    }
    if let Some(v) = file.username {
        config.username = v;
    }
    if let Some(v) = file.lookback_rounds {
        config.lookback_rounds = v;
    }
    Ok(config)
}

/// Merges CLI overrides onto a config base.
pub fn apply_cli(config: &mut StreamConfig, cli: &CliArgs) {
    if let Some(ref v) = cli.chat_addr {
        config.chat_addr = v.clone();
    }
    if let Some(ref v) = cli.ledger_url {
        config.ledger_url = v.clone();
    }
    if let Some(ref v) = cli.ledger_token {
        config.ledger_token = v.clone();
    }
    if let Some(ref v) = cli.custody_url {
        config.custody_url = v.clone();
    }
    if let Some(ref v) = cli.custody_token {
        config.custody_token = v.clone();
    }
    if let Some(ref v) = cli.wallet_name {
        config.wallet_name = v.clone();
    }
    if let Some(ref v) = cli.wallet_password {
        config.wallet_password = v.clone();
    }
    if let Some(ref v) = cli.from_addr {
        config.from_addr = v.clone();
    }
    if let Some(ref v) = cli.username {
        config.username = v.clone();
    }
    if let Some(v) = cli.lookback_rounds {
        config.lookback_rounds = v;
    }
}

fn print_help() {
    println!(
        r#"Notechat - chat over a ledger's transaction notes

USAGE:
    notechat [OPTIONS]

OPTIONS:
    --chat-addr <ADDR>       Shared chat account address
    --ledger-url <URL>       Ledger node REST endpoint (default: http://localhost:8080)
    --ledger-token <TOKEN>   Ledger node API token
    --custody-url <URL>      Key-custody service REST endpoint (default: http://localhost:7833)
    --custody-token <TOKEN>  Key-custody service API token
    --wallet <NAME>          Wallet name that pays the fees
    --password <PASS>        Wallet password (or set NOTECHAT_WALLET_PASSWORD)
    --from <ADDR>            Address inside the wallet to send from
    --username <NAME>        Display name for outgoing messages (default: Guest)
    --lookback <ROUNDS>      Historical rounds scanned at startup (default: 1000)
    --config <PATH>          Load settings from JSON config file
    -h, --help               Show this help

EXAMPLES:
    # Sandbox node with default ports
    notechat --wallet unencrypted-default-wallet --from KPLD4GPZ... --username alice

    # Use config file
    notechat --config ~/.notechat.json

ENVIRONMENT:
    NOTECHAT_WALLET_PASSWORD  Wallet password (avoids putting it on the command line)
    RUST_LOG                  Log level filter (default: info)
"#
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
