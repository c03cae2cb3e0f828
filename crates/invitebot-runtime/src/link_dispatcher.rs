//! Routes inbound administrative commands through the access guard, the
//! conversation controller and the batch completion pipeline.

use std::sync::Arc;

use anyhow::{Context, Result};
use invitebot_access::AccessGuard;
use invitebot_telegram::{InboundMessage, MessagingPlatform};
use serde::{Deserialize, Serialize};

use crate::batch_provisioner::BatchProvisioner;
use crate::bot_commands::{parse_bot_command, BotCommand};
use crate::conversation::{ConversationController, ConversationEffect, ConversationInput};
use crate::destination_registry::DestinationRegistry;
use crate::link_batch::LinkLabel;
use crate::link_presenter::LinkPresenter;
use crate::link_store::LinkStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Whether `/newlink` provisions at once or walks the label/confirm dialogue.
pub enum FlowMode {
    SingleStep,
    #[default]
    Conversational,
}

impl FlowMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SingleStep => "single_step",
            Self::Conversational => "conversational",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LinkDispatcherConfig {
    pub registry: DestinationRegistry,
    pub guard: AccessGuard,
    pub presenter: LinkPresenter,
    pub store: LinkStore,
    pub broadcast_chat_id: Option<i64>,
    pub flow: FlowMode,
    pub max_in_flight: usize,
}

/// Owns every collaborator of the bot; nothing here is process-global.
pub struct LinkDispatcher {
    registry: DestinationRegistry,
    guard: AccessGuard,
    presenter: LinkPresenter,
    store: LinkStore,
    broadcast_chat_id: Option<i64>,
    flow: FlowMode,
    provisioner: BatchProvisioner,
    platform: Arc<dyn MessagingPlatform>,
    conversations: ConversationController,
}

impl LinkDispatcher {
    pub fn new(config: LinkDispatcherConfig, platform: Arc<dyn MessagingPlatform>) -> Self {
        Self {
            provisioner: BatchProvisioner::new(platform.clone(), config.max_in_flight),
            registry: config.registry,
            guard: config.guard,
            presenter: config.presenter,
            store: config.store,
            broadcast_chat_id: config.broadcast_chat_id,
            flow: config.flow,
            platform,
            conversations: ConversationController::new(),
        }
    }

    pub fn flow(&self) -> FlowMode {
        self.flow
    }

    pub fn conversations(&self) -> &ConversationController {
        &self.conversations
    }

    /// Handles one inbound message and sends the reply, if any, back to its chat.
    pub async fn handle_message(&mut self, message: &InboundMessage) -> Result<()> {
        let Some(reply) = self.respond(message).await? else {
            return Ok(());
        };
        self.platform
            .send_message(message.chat_id, &reply)
            .await
            .with_context(|| format!("failed to send reply to chat {}", message.chat_id))
    }

    /// Computes the reply text for one inbound message; `None` means stay quiet.
    pub async fn respond(&mut self, message: &InboundMessage) -> Result<Option<String>> {
        let command = parse_bot_command(&message.text);
        let requester_id = message.requester_id;
        tracing::debug!(
            requester_id,
            chat_id = message.chat_id,
            command = command.name(),
            "inbound command"
        );

        let targets_pending = matches!(command, BotCommand::Text { .. })
            && self.conversations.is_pending(requester_id);
        if command.requires_authorization() || targets_pending {
            let decision = self.guard.evaluate(requester_id);
            if !decision.is_allowed() {
                return Ok(self
                    .guard
                    .deny_policy()
                    .replies_on_denial()
                    .then(|| self.presenter.render_access_denied()));
            }
        }

        match command {
            BotCommand::Help => Ok(Some(self.presenter.render_usage())),
            BotCommand::ShowLinks => Ok(Some(self.render_stored_links())),
            BotCommand::Unknown { name } => {
                Ok(Some(self.presenter.render_unknown_command(&name)))
            }
            BotCommand::NewLink { label } => match self.flow {
                FlowMode::SingleStep => {
                    let raw_label = label.unwrap_or_else(|| {
                        format!("Request from {}", message.requester_name)
                    });
                    let label = LinkLabel::parse(&raw_label)
                        .with_context(|| format!("invalid label for requester {requester_id}"))?;
                    Ok(Some(self.complete_batch(&label).await))
                }
                FlowMode::Conversational => {
                    self.advance_conversation(
                        requester_id,
                        ConversationInput::Start {
                            inline_label: label,
                        },
                    )
                    .await
                }
            },
            BotCommand::Confirm => {
                self.advance_conversation(requester_id, ConversationInput::Confirm)
                    .await
            }
            BotCommand::Cancel => {
                self.advance_conversation(requester_id, ConversationInput::Cancel)
                    .await
            }
            BotCommand::Text { text } => {
                self.advance_conversation(requester_id, ConversationInput::Text(text))
                    .await
            }
        }
    }

    async fn advance_conversation(
        &mut self,
        requester_id: i64,
        input: ConversationInput,
    ) -> Result<Option<String>> {
        let reply = match self.conversations.handle(requester_id, input) {
            ConversationEffect::PromptLabel => Some(self.presenter.render_label_prompt()),
            ConversationEffect::PromptConfirmation { label } => Some(
                self.presenter
                    .render_confirmation_prompt(label.as_str(), self.registry.len()),
            ),
            ConversationEffect::Execute { label } => Some(self.complete_batch(&label).await),
            ConversationEffect::Cancelled => Some(self.presenter.render_cancelled()),
            ConversationEffect::NothingToCancel => Some(self.presenter.render_nothing_to_cancel()),
            ConversationEffect::Ignored => None,
        };
        Ok(reply)
    }

    /// Provision, persist, render, broadcast. Rendering never depends on the
    /// save succeeding and a broadcast failure only adds a warning.
    async fn complete_batch(&self, label: &LinkLabel) -> String {
        let batch = self.provisioner.run(label, self.registry.list()).await;
        let report = self.presenter.render_report(&batch, Some(label.as_str()));
        let mut sections = vec![report.clone(), self.presenter.render_summary(&batch)];

        if let Err(error) = self.store.save(label, &batch) {
            tracing::warn!(
                path = %self.store.path().display(),
                error = %error,
                "failed to persist link batch"
            );
            sections.push(self.presenter.render_save_failed(&error.to_string()));
        }

        if let Some(broadcast_chat_id) = self.broadcast_chat_id {
            if let Err(error) = self.platform.send_message(broadcast_chat_id, &report).await {
                tracing::warn!(
                    chat_id = broadcast_chat_id,
                    error = %error,
                    "failed to broadcast link batch"
                );
                sections.push(self.presenter.render_broadcast_failed(&error.to_string()));
            }
        }

        sections.join("\n\n")
    }

    fn render_stored_links(&self) -> String {
        match self.store.load() {
            Ok(Some(stored)) if !stored.batch.is_empty() => self
                .presenter
                .render_report(&stored.batch, stored.label.as_deref()),
            Ok(_) => self.presenter.render_empty(),
            Err(error) => {
                tracing::warn!(
                    path = %self.store.path().display(),
                    error = %error,
                    "failed to load link batch"
                );
                self.presenter.render_load_failed(&error.to_string())
            }
        }
    }
}
