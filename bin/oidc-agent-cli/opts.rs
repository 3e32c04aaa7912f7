use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

const DESCRIPTION: &str = r#"
A thin manual/integration driver for oidc-agent-core.

Loads a plaintext accounts.toml file and an AgentConfig, then runs the engine against one
account. This is a demonstration convenience, not the real account store -- a production
deployment decrypts its account records from an external daemon, not from plaintext TOML.
"#;

#[derive(Parser)]
#[command(name = "oidc-agent-cli", version, author, about = DESCRIPTION)]
pub struct Opts {
    #[arg(
        short = 'a',
        long = "accounts",
        env = "OIDC_AGENT_ACCOUNTS",
        help = "Path to the accounts.toml file",
        default_value = "./accounts.toml"
    )]
    pub accounts_path: PathBuf,

    #[arg(
        short = 'c',
        long = "config",
        env = "OIDC_AGENT_CONFIG",
        help = "Path to an AgentConfig TOML file; falls back to built-in defaults if absent"
    )]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub subcmd: SubCommand,
}

#[derive(Subcommand)]
pub enum SubCommand {
    #[command(name = "get-token", about = "Acquire an access token for one account")]
    GetToken(GetToken),
    #[command(name = "list-accounts", about = "List the accounts loaded from accounts.toml")]
    ListAccounts(ListAccounts),
}

#[derive(Args)]
pub struct GetToken {
    #[arg(value_name = "ACCOUNT", help = "The account's short name")]
    pub account: String,

    #[arg(
        long = "min-valid-secs",
        help = "Minimum remaining validity required of a cached token before a new one is acquired"
    )]
    pub min_valid_secs: Option<i64>,

    #[arg(long = "scope", help = "Scope override for this request")]
    pub scope: Option<String>,

    #[arg(
        long = "flow-order",
        help = "Comma-separated flow order for this request, e.g. refresh,device"
    )]
    pub flow_order: Option<String>,
}

#[derive(Args)]
pub struct ListAccounts {}
