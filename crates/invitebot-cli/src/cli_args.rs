use std::path::PathBuf;

use clap::{ArgAction, Parser};
use invitebot_runtime::DEFAULT_POLL_TIMEOUT_SECONDS;
use invitebot_telegram::DEFAULT_TELEGRAM_API_BASE;

fn parse_positive_usize(value: &str) -> Result<usize, String> {
    let parsed = value
        .parse::<usize>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Parser)]
#[command(
    name = "invitebot",
    about = "Telegram bot that creates join-request invite links for a fixed set of channels",
    version
)]
pub(crate) struct Cli {
    #[arg(
        long = "bot-token",
        env = "INVITEBOT_BOT_TOKEN",
        hide_env_values = true,
        help = "Telegram bot token used for polling, replies and invite link creation"
    )]
    pub(crate) bot_token: Option<String>,

    #[arg(
        long = "config",
        env = "INVITEBOT_CONFIG",
        default_value = "invitebot.json",
        help = "Deployment file with destinations, administrators and delivery options"
    )]
    pub(crate) config: PathBuf,

    #[arg(
        long = "state-dir",
        env = "INVITEBOT_STATE_DIR",
        default_value = ".invitebot",
        help = "Directory holding the stored link batch (links.json)"
    )]
    pub(crate) state_dir: PathBuf,

    #[arg(
        long = "telegram-api-base",
        env = "INVITEBOT_TELEGRAM_API_BASE",
        default_value = DEFAULT_TELEGRAM_API_BASE,
        help = "Telegram Bot API base URL"
    )]
    pub(crate) telegram_api_base: String,

    #[arg(
        long = "request-timeout-ms",
        env = "INVITEBOT_REQUEST_TIMEOUT_MS",
        default_value_t = 15_000,
        value_parser = parse_positive_u64,
        help = "Timeout for one Telegram API request in milliseconds"
    )]
    pub(crate) request_timeout_ms: u64,

    #[arg(
        long = "poll-timeout-seconds",
        env = "INVITEBOT_POLL_TIMEOUT_SECONDS",
        default_value_t = DEFAULT_POLL_TIMEOUT_SECONDS,
        help = "Long-poll timeout passed to getUpdates"
    )]
    pub(crate) poll_timeout_seconds: u64,

    #[arg(
        long = "max-in-flight",
        env = "INVITEBOT_MAX_IN_FLIGHT",
        default_value_t = 1,
        value_parser = parse_positive_usize,
        help = "Maximum concurrent invite link requests per batch (1 keeps requests sequential)"
    )]
    pub(crate) max_in_flight: usize,

    #[arg(
        long = "print-links",
        env = "INVITEBOT_PRINT_LINKS",
        default_value_t = false,
        action = ArgAction::SetTrue,
        help = "Print the stored link batch and exit"
    )]
    pub(crate) print_links: bool,
}
