//! Parsing of inbound chat text into bot commands.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Help,
    NewLink { label: Option<String> },
    ShowLinks,
    Confirm,
    Cancel,
    Unknown { name: String },
    Text { text: String },
}

impl BotCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::NewLink { .. } => "newlink",
            Self::ShowLinks => "links",
            Self::Confirm => "confirm",
            Self::Cancel => "cancel",
            Self::Unknown { .. } => "unknown",
            Self::Text { .. } => "text",
        }
    }

    /// Help is public; everything that reads or creates links is gated.
    pub fn requires_authorization(&self) -> bool {
        !matches!(self, Self::Help | Self::Text { .. })
    }
}

/// Parses `/command[@BotName] [args]`; anything else is free text.
pub fn parse_bot_command(raw: &str) -> BotCommand {
    let trimmed = raw.trim();
    let Some(command_line) = trimmed.strip_prefix('/') else {
        return BotCommand::Text {
            text: trimmed.to_string(),
        };
    };

    let mut parts = command_line.splitn(2, char::is_whitespace);
    let command_token = parts.next().unwrap_or_default();
    let remainder = parts.next().unwrap_or_default().trim();
    let command = command_token
        .split_once('@')
        .map_or(command_token, |(command, _bot_name)| command)
        .to_ascii_lowercase();

    match command.as_str() {
        "start" | "help" => BotCommand::Help,
        "newlink" => BotCommand::NewLink {
            label: (!remainder.is_empty()).then(|| remainder.to_string()),
        },
        "links" => BotCommand::ShowLinks,
        "confirm" => BotCommand::Confirm,
        "cancel" => BotCommand::Cancel,
        _ => BotCommand::Unknown { name: command },
    }
}

/// Interprets a free-text yes/no answer; `None` when it is neither.
pub fn parse_confirmation_answer(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "yes" | "y" | "confirm" => Some(true),
        "no" | "n" | "cancel" => Some(false),
        _ => None,
    }
}
