//! Per-requester label → confirm → execute dialogue as an explicit state machine.

use std::collections::HashMap;

use crate::bot_commands::parse_confirmation_answer;
use crate::link_batch::LinkLabel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationStage {
    AwaitingLabel,
    AwaitingConfirmation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// In-flight dialogue of one requester. Absence of a state means idle.
pub enum ConversationState {
    AwaitingLabel,
    AwaitingConfirmation { label: LinkLabel },
}

impl ConversationState {
    pub fn stage(&self) -> ConversationStage {
        match self {
            Self::AwaitingLabel => ConversationStage::AwaitingLabel,
            Self::AwaitingConfirmation { .. } => ConversationStage::AwaitingConfirmation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationInput {
    Start { inline_label: Option<String> },
    Text(String),
    Confirm,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// What the caller must do after a transition.
pub enum ConversationEffect {
    PromptLabel,
    PromptConfirmation { label: LinkLabel },
    Execute { label: LinkLabel },
    Cancelled,
    NothingToCancel,
    /// Input arrived with no pending dialogue; nothing to do.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: Option<ConversationState>,
    pub effect: ConversationEffect,
}

impl Transition {
    fn to(next: Option<ConversationState>, effect: ConversationEffect) -> Self {
        Self { next, effect }
    }

    fn confirm(label: LinkLabel) -> Self {
        Self::to(
            Some(ConversationState::AwaitingConfirmation {
                label: label.clone(),
            }),
            ConversationEffect::PromptConfirmation { label },
        )
    }

    fn await_label() -> Self {
        Self::to(
            Some(ConversationState::AwaitingLabel),
            ConversationEffect::PromptLabel,
        )
    }
}

/// Pure transition function; `None` is the idle state.
pub fn transition(current: Option<&ConversationState>, input: ConversationInput) -> Transition {
    match (current, input) {
        (_, ConversationInput::Start { inline_label }) => {
            match inline_label.as_deref().map(LinkLabel::parse) {
                Some(Ok(label)) => Transition::confirm(label),
                _ => Transition::await_label(),
            }
        }
        (None, ConversationInput::Cancel) => {
            Transition::to(None, ConversationEffect::NothingToCancel)
        }
        (None, ConversationInput::Text(_) | ConversationInput::Confirm) => {
            Transition::to(None, ConversationEffect::Ignored)
        }
        (Some(_), ConversationInput::Cancel) => Transition::to(None, ConversationEffect::Cancelled),
        (Some(ConversationState::AwaitingLabel), ConversationInput::Text(text)) => {
            match LinkLabel::parse(&text) {
                Ok(label) => Transition::confirm(label),
                Err(_) => Transition::await_label(),
            }
        }
        (Some(ConversationState::AwaitingLabel), ConversationInput::Confirm) => {
            Transition::await_label()
        }
        (Some(ConversationState::AwaitingConfirmation { label }), ConversationInput::Confirm) => {
            Transition::to(
                None,
                ConversationEffect::Execute {
                    label: label.clone(),
                },
            )
        }
        (Some(ConversationState::AwaitingConfirmation { label }), ConversationInput::Text(text)) => {
            match parse_confirmation_answer(&text) {
                Some(true) => Transition::to(
                    None,
                    ConversationEffect::Execute {
                        label: label.clone(),
                    },
                ),
                Some(false) => Transition::to(None, ConversationEffect::Cancelled),
                None => Transition::confirm(label.clone()),
            }
        }
    }
}

#[derive(Debug, Default)]
/// Session map of pending dialogues keyed by requester id.
pub struct ConversationController {
    sessions: HashMap<i64, ConversationState>,
}

impl ConversationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, requester_id: i64, input: ConversationInput) -> ConversationEffect {
        let Transition { next, effect } = transition(self.sessions.get(&requester_id), input);
        match next {
            Some(state) => {
                self.sessions.insert(requester_id, state);
            }
            None => {
                self.sessions.remove(&requester_id);
            }
        }
        effect
    }

    pub fn stage(&self, requester_id: i64) -> Option<ConversationStage> {
        self.sessions
            .get(&requester_id)
            .map(ConversationState::stage)
    }

    pub fn is_pending(&self, requester_id: i64) -> bool {
        self.sessions.contains_key(&requester_id)
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }
}
