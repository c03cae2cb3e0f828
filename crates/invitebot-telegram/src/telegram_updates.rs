use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A text message addressed to the bot, reduced to what command dispatch needs.
pub struct InboundMessage {
    pub update_id: i64,
    pub chat_id: i64,
    pub requester_id: i64,
    pub requester_name: String,
    pub text: String,
}

/// Extracts an [`InboundMessage`] from one raw `getUpdates` entry.
///
/// Returns `None` for anything that is not a `message` update carrying text,
/// a chat id and a sender id (edits, channel posts, stickers, service messages).
pub fn parse_inbound_message(update: &Value) -> Option<InboundMessage> {
    let update_id = update.get("update_id").and_then(Value::as_i64)?;
    let message = update.get("message")?;
    let text = message.get("text").and_then(Value::as_str)?;
    let chat_id = message
        .get("chat")
        .and_then(|chat| chat.get("id"))
        .and_then(Value::as_i64)?;
    let from = message.get("from")?;
    let requester_id = from.get("id").and_then(Value::as_i64)?;

    Some(InboundMessage {
        update_id,
        chat_id,
        requester_id,
        requester_name: display_name(from).unwrap_or_else(|| requester_id.to_string()),
        text: text.to_string(),
    })
}

fn display_name(from: &Value) -> Option<String> {
    let field = |key: &str| {
        from.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };
    let full_name = [field("first_name"), field("last_name")]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    if !full_name.is_empty() {
        return Some(full_name);
    }
    field("username").map(|username| format!("@{username}"))
}
