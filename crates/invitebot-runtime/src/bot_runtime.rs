//! Long-polling loop that feeds Telegram updates into the link dispatcher.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use invitebot_telegram::TelegramApiClient;

use crate::link_dispatcher::{LinkDispatcher, LinkDispatcherConfig};

pub const DEFAULT_POLL_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_POLL_ERROR_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct InviteBotRuntimeConfig {
    pub telegram_api_base: String,
    pub bot_token: String,
    pub request_timeout_ms: u64,
    pub poll_timeout_seconds: u64,
    pub poll_error_delay: Duration,
    pub dispatcher: LinkDispatcherConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollCycleReport {
    pub handled_messages: usize,
    pub failed_messages: usize,
    pub skipped_updates: usize,
}

impl PollCycleReport {
    fn is_idle(&self) -> bool {
        self.handled_messages == 0 && self.failed_messages == 0 && self.skipped_updates == 0
    }
}

pub async fn run_invite_bot(config: InviteBotRuntimeConfig) -> Result<()> {
    let mut runtime = InviteBotRuntime::new(config)?;
    runtime.run().await
}

pub struct InviteBotRuntime {
    client: Arc<TelegramApiClient>,
    dispatcher: LinkDispatcher,
    poll_timeout_seconds: u64,
    poll_error_delay: Duration,
    offset: Option<i64>,
}

impl InviteBotRuntime {
    pub fn new(config: InviteBotRuntimeConfig) -> Result<Self> {
        let client = Arc::new(
            TelegramApiClient::new(
                &config.telegram_api_base,
                &config.bot_token,
                config.request_timeout_ms,
            )
            .context("failed to initialize invite bot runtime")?,
        );
        let dispatcher = LinkDispatcher::new(config.dispatcher, client.clone());
        Ok(Self {
            client,
            dispatcher,
            poll_timeout_seconds: config.poll_timeout_seconds,
            poll_error_delay: config.poll_error_delay,
            offset: None,
        })
    }

    pub fn offset(&self) -> Option<i64> {
        self.offset
    }

    /// Fetches one page of updates and dispatches every message in arrival order.
    ///
    /// A message whose handling fails is logged and counted; it never stops the
    /// rest of the page or the offset from advancing.
    pub async fn poll_once(&mut self) -> Result<PollCycleReport> {
        let batch = self
            .client
            .get_updates(self.offset, self.poll_timeout_seconds)
            .await
            .context("failed to poll telegram updates")?;
        self.offset = batch.next_offset;

        let mut report = PollCycleReport {
            skipped_updates: batch.skipped_updates,
            ..PollCycleReport::default()
        };
        for message in &batch.messages {
            match self.dispatcher.handle_message(message).await {
                Ok(()) => report.handled_messages = report.handled_messages.saturating_add(1),
                Err(error) => {
                    report.failed_messages = report.failed_messages.saturating_add(1);
                    tracing::warn!(
                        update_id = message.update_id,
                        requester_id = message.requester_id,
                        error = %format!("{error:#}"),
                        "failed to handle inbound message"
                    );
                }
            }
        }
        Ok(report)
    }

    /// Polls until Ctrl-C. A batch still running at shutdown is dropped unsaved.
    pub async fn run(&mut self) -> Result<()> {
        tracing::info!(
            flow = self.dispatcher.flow().as_str(),
            poll_timeout_seconds = self.poll_timeout_seconds,
            "invite bot polling started"
        );
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("invite bot shutdown requested");
                    return Ok(());
                }
                result = self.poll_once() => match result {
                    Ok(report) => {
                        if !report.is_idle() {
                            tracing::info!(
                                handled = report.handled_messages,
                                failed = report.failed_messages,
                                skipped = report.skipped_updates,
                                "invite bot poll cycle"
                            );
                        }
                    }
                    Err(error) => {
                        tracing::warn!(error = %format!("{error:#}"), "invite bot poll failed");
                        tokio::select! {
                            _ = tokio::signal::ctrl_c() => {
                                tracing::info!("invite bot shutdown requested");
                                return Ok(());
                            }
                            _ = tokio::time::sleep(self.poll_error_delay) => {}
                        }
                    }
                }
            }
        }
    }
}
