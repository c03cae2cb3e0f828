mod bootstrap_helpers;
mod cli_args;
mod deployment_config;

use anyhow::{Context, Result};
use clap::Parser;
use invitebot_runtime::{
    run_invite_bot, InviteBotRuntimeConfig, LinkPresenter, LinkStore, DEFAULT_POLL_ERROR_DELAY,
};

use crate::bootstrap_helpers::init_tracing;
use crate::cli_args::Cli;
use crate::deployment_config::load_deployment_config;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    run_cli(cli).await
}

async fn run_cli(cli: Cli) -> Result<()> {
    if cli.print_links {
        let report = render_stored_links(&cli)?;
        println!("{report}");
        return Ok(());
    }

    let bot_token = cli
        .bot_token
        .clone()
        .filter(|token| !token.trim().is_empty())
        .context("--bot-token (or INVITEBOT_BOT_TOKEN) is required to run the bot")?;
    let deployment = load_deployment_config(&cli.config)?;
    let dispatcher = deployment.into_dispatcher_config(&cli.state_dir, cli.max_in_flight)?;
    tracing::info!(
        destinations = dispatcher.registry.len(),
        admins = dispatcher.guard.allowed_count(),
        flow = dispatcher.flow.as_str(),
        deny_policy = dispatcher.guard.deny_policy().as_str(),
        broadcast = dispatcher.broadcast_chat_id.is_some(),
        max_in_flight = cli.max_in_flight,
        state_dir = %cli.state_dir.display(),
        "invite bot configured"
    );

    run_invite_bot(InviteBotRuntimeConfig {
        telegram_api_base: cli.telegram_api_base,
        bot_token,
        request_timeout_ms: cli.request_timeout_ms,
        poll_timeout_seconds: cli.poll_timeout_seconds,
        poll_error_delay: DEFAULT_POLL_ERROR_DELAY,
        dispatcher,
    })
    .await
}

/// Renders the stored batch; the deployment file is only consulted for line width.
fn render_stored_links(cli: &Cli) -> Result<String> {
    let presenter = if cli.config.exists() {
        load_deployment_config(&cli.config)?.presenter()
    } else {
        LinkPresenter::default()
    };
    let store = LinkStore::for_state_dir(&cli.state_dir);
    let stored = store
        .load()
        .with_context(|| format!("failed to print links from {}", store.path().display()))?;
    Ok(match stored {
        Some(stored) if !stored.batch.is_empty() => {
            presenter.render_report(&stored.batch, stored.label.as_deref())
        }
        _ => presenter.render_empty(),
    })
}
