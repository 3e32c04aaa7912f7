use std::collections::HashMap;
use std::io::IsTerminal;
use std::sync::Arc;

use clap::Parser;
use oidc_agent_core::account::Account;
use oidc_agent_core::config::AgentConfig;
use oidc_agent_core::flow_order::FlowOrder;
use oidc_agent_core::http::ReqwestTransport;
use oidc_agent_core::orchestrator::TokenRequest;
use oidc_agent_core::store::AccountStore;

mod opts;
use opts::{GetToken, Opts, SubCommand};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{e}");
        for (i, cause) in e.chain().enumerate() {
            if i > 0 {
                if i == 1 {
                    eprintln!("\nError trace:");
                }
                eprintln!("\t{i}: {cause}");
            }
        }
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let opts = Opts::parse();
    let config = AgentConfig::load(opts.config_path.as_deref())?;

    let accounts_toml = std::fs::read_to_string(&opts.accounts_path).map_err(|e| {
        anyhow::anyhow!("failed to read accounts file {:?}: {e}", opts.accounts_path)
    })?;
    let accounts: HashMap<String, Account> = toml::from_str(&accounts_toml).map_err(|e| {
        anyhow::anyhow!("failed to parse accounts file {:?}: {e}", opts.accounts_path)
    })?;

    let store = AccountStore::new();
    for (name, mut account) in accounts.into_iter() {
        account.name = name;
        if account.trust_anchor_path.is_none() {
            account.trust_anchor_path = config.default_trust_anchor_path.clone();
        }
        store.load(account).await;
    }

    let transport = Arc::new(ReqwestTransport::new(
        config.http_timeout(),
        config.http_timeout(),
    ));

    match opts.subcmd {
        SubCommand::GetToken(args) => get_token(&store, &config, transport, args).await,
        SubCommand::ListAccounts(_) => list_accounts(&store).await,
    }
}

async fn get_token(
    store: &AccountStore,
    config: &AgentConfig,
    transport: Arc<ReqwestTransport>,
    args: GetToken,
) -> anyhow::Result<()> {
    let min_valid_secs = args.min_valid_secs.unwrap_or(config.default_min_valid_secs);
    let flow_order = args
        .flow_order
        .as_deref()
        .map(FlowOrder::parse_bare)
        .transpose()
        .map_err(|e| anyhow::anyhow!("invalid --flow-order: {e}"))?;
    let scope = args.scope;
    let account_name = args.account;

    // Sweep death-expired accounts out of the store before dispatching: a flow must never run
    // against an account whose lifetime has already elapsed.
    store.sweep_expired().await;

    let token = store
        .with_account_mut(&account_name, move |account| async move {
            let mut request = TokenRequest::new(min_valid_secs);
            request.scope_override = scope.as_deref();
            request.flow_order = flow_order.as_ref();
            oidc_agent_core::get_access_token(account, transport.as_ref(), request).await
        })
        .await?;

    println!("{token}");
    Ok(())
}

async fn list_accounts(store: &AccountStore) -> anyhow::Result<()> {
    let mut names = store.list_names().await;
    names.sort();
    for name in names {
        println!("{name}");
    }
    Ok(())
}
