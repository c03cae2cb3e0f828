//! Telegram Bot API client used for invite-link creation, replies and polling.

use std::time::Duration;

use anyhow::{bail, Context};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::messaging_platform::{InviteLinkRequest, MessagingPlatform, PlatformError};
use crate::telegram_helpers::{chunk_text_by_lines, truncate_for_error, TELEGRAM_MAX_MESSAGE_CHARS};
use crate::telegram_updates::{parse_inbound_message, InboundMessage};

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Deserialize)]
struct TelegramEnvelope<T> {
    ok: bool,
    result: Option<T>,
    error_code: Option<i64>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TelegramChatInviteLink {
    invite_link: String,
}

#[derive(Debug, Default)]
/// One `getUpdates` page: the parsed text messages and the offset to request next.
pub struct TelegramUpdateBatch {
    pub messages: Vec<InboundMessage>,
    pub next_offset: Option<i64>,
    pub skipped_updates: usize,
}

#[derive(Clone)]
pub struct TelegramApiClient {
    http: reqwest::Client,
    api_base: String,
    bot_token: String,
}

impl std::fmt::Debug for TelegramApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramApiClient")
            .field("api_base", &self.api_base)
            .field("bot_token", &"(redacted)")
            .finish()
    }
}

impl TelegramApiClient {
    pub fn new(api_base: &str, bot_token: &str, request_timeout_ms: u64) -> anyhow::Result<Self> {
        let bot_token = bot_token.trim();
        if bot_token.is_empty() {
            bail!("telegram bot token cannot be empty");
        }
        let api_base = api_base.trim().trim_end_matches('/');
        if api_base.is_empty() {
            bail!("telegram api base cannot be empty");
        }

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("invitebot"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(request_timeout_ms.max(1)))
            .build()
            .context("failed to create telegram api client")?;

        Ok(Self {
            http,
            api_base: api_base.to_string(),
            bot_token: bot_token.to_string(),
        })
    }

    /// Long-polls for new updates starting at `offset`.
    ///
    /// Updates that are not text messages are counted as skipped; the returned
    /// offset still moves past them so they are not redelivered.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_seconds: u64,
    ) -> Result<TelegramUpdateBatch, PlatformError> {
        let mut payload = json!({
            "timeout": timeout_seconds,
            "allowed_updates": ["message"],
        });
        if let Some(offset) = offset {
            payload["offset"] = Value::from(offset);
        }
        // Long polls hold the connection open for `timeout_seconds` on the server side.
        let request_timeout = Duration::from_secs(timeout_seconds.saturating_add(10));
        let updates: Vec<Value> = self
            .call_method("getUpdates", &payload, Some(request_timeout))
            .await?;

        let mut batch = TelegramUpdateBatch {
            next_offset: offset,
            ..TelegramUpdateBatch::default()
        };
        for update in &updates {
            if let Some(update_id) = update.get("update_id").and_then(Value::as_i64) {
                let candidate = update_id.saturating_add(1);
                batch.next_offset = Some(batch.next_offset.map_or(candidate, |current| {
                    current.max(candidate)
                }));
            }
            match parse_inbound_message(update) {
                Some(message) => batch.messages.push(message),
                None => batch.skipped_updates = batch.skipped_updates.saturating_add(1),
            }
        }
        Ok(batch)
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.bot_token, method)
    }

    async fn call_method<T>(
        &self,
        method: &'static str,
        payload: &Value,
        timeout: Option<Duration>,
    ) -> Result<T, PlatformError>
    where
        T: DeserializeOwned,
    {
        tracing::debug!(method, "calling telegram bot api");
        let mut request = self.http.post(self.method_url(method)).json(payload);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request
            .send()
            .await
            .map_err(|error| PlatformError::Transport {
                method,
                source: error.without_url(),
            })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| PlatformError::Transport {
                method,
                source: error.without_url(),
            })?;

        let envelope = match serde_json::from_str::<TelegramEnvelope<T>>(&body) {
            Ok(envelope) => envelope,
            Err(error) if status.is_success() => {
                return Err(PlatformError::Decode {
                    method,
                    detail: error.to_string(),
                });
            }
            Err(_) => {
                return Err(PlatformError::HttpStatus {
                    method,
                    status: status.as_u16(),
                    body: truncate_for_error(&body, 320),
                });
            }
        };
        if !envelope.ok {
            return Err(PlatformError::Rejected {
                method,
                error_code: envelope.error_code,
                description: envelope
                    .description
                    .filter(|value| !value.trim().is_empty())
                    .unwrap_or_else(|| format!("telegram {method} failed with status {status}")),
            });
        }
        envelope
            .result
            .ok_or(PlatformError::MissingResult { method })
    }
}

#[async_trait]
impl MessagingPlatform for TelegramApiClient {
    async fn create_invite_link(
        &self,
        request: &InviteLinkRequest,
    ) -> Result<String, PlatformError> {
        let payload = serde_json::to_value(request).map_err(|error| PlatformError::Decode {
            method: "createChatInviteLink",
            detail: error.to_string(),
        })?;
        let link: TelegramChatInviteLink = self
            .call_method("createChatInviteLink", &payload, None)
            .await?;
        Ok(link.invite_link)
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), PlatformError> {
        for chunk in chunk_text_by_lines(text, TELEGRAM_MAX_MESSAGE_CHARS) {
            let payload = json!({
                "chat_id": chat_id,
                "text": chunk,
                "disable_web_page_preview": true,
            });
            let _: Value = self.call_method("sendMessage", &payload, None).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::TelegramApiClient;
    use crate::messaging_platform::{InviteLinkRequest, MessagingPlatform, PlatformError};

    fn client(base_url: &str) -> TelegramApiClient {
        TelegramApiClient::new(base_url, "test-token", 3_000).expect("client")
    }

    #[test]
    fn unit_new_rejects_blank_token_and_base() {
        let error = TelegramApiClient::new("https://api.telegram.org", "  ", 1_000)
            .expect_err("blank token");
        assert!(error.to_string().contains("bot token cannot be empty"));
        let error = TelegramApiClient::new(" ", "token", 1_000).expect_err("blank base");
        assert!(error.to_string().contains("api base cannot be empty"));
    }

    #[test]
    fn regression_debug_output_redacts_bot_token() {
        let client = client("https://api.telegram.org/");
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("test-token"));
        assert!(rendered.contains("https://api.telegram.org\""));
    }

    #[tokio::test]
    async fn integration_create_invite_link_posts_join_request_payload() {
        let server = MockServer::start();
        let created = server.mock(|when, then| {
            when.method(POST)
                .path("/bottest-token/createChatInviteLink")
                .json_body_includes(
                    json!({
                        "chat_id": -1001,
                        "name": "spring",
                        "creates_join_request": true
                    })
                    .to_string(),
                );
            then.status(200).json_body(json!({
                "ok": true,
                "result": {
                    "invite_link": "https://t.me/+abc",
                    "creates_join_request": true,
                    "is_primary": false,
                    "is_revoked": false
                }
            }));
        });

        let url = client(&server.base_url())
            .create_invite_link(&InviteLinkRequest::join_request_gated(-1001, "spring"))
            .await
            .expect("invite link");
        created.assert_calls(1);
        assert_eq!(url, "https://t.me/+abc");
    }

    #[tokio::test]
    async fn functional_create_invite_link_surfaces_platform_description() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/bottest-token/createChatInviteLink");
            then.status(400).json_body(json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: not enough rights to manage chat invite link"
            }));
        });

        let error = client(&server.base_url())
            .create_invite_link(&InviteLinkRequest::join_request_gated(-1002, "spring"))
            .await
            .expect_err("rejected");
        assert!(matches!(
            error,
            PlatformError::Rejected {
                error_code: Some(400),
                ..
            }
        ));
        assert_eq!(
            error.to_string(),
            "Bad Request: not enough rights to manage chat invite link"
        );
    }

    #[tokio::test]
    async fn regression_non_json_error_body_maps_to_http_status() {
        let server = MockServer::start();
        let failing = server.mock(|when, then| {
            when.method(POST).path("/bottest-token/createChatInviteLink");
            then.status(502).body("<html>bad gateway</html>");
        });

        let error = client(&server.base_url())
            .create_invite_link(&InviteLinkRequest::join_request_gated(-1003, "spring"))
            .await
            .expect_err("bad gateway");
        failing.assert_calls(1);
        assert!(matches!(error, PlatformError::HttpStatus { status: 502, .. }));
    }

    #[tokio::test]
    async fn regression_transport_error_does_not_leak_bot_token() {
        let client = TelegramApiClient::new("http://127.0.0.1:1", "secret-token", 500)
            .expect("client");
        let error = client
            .send_message(42, "hello")
            .await
            .expect_err("connection refused");
        assert!(matches!(error, PlatformError::Transport { .. }));
        assert!(!format!("{error:?}").contains("secret-token"));
        assert!(!error.to_string().contains("secret-token"));
    }

    #[tokio::test]
    async fn functional_send_message_splits_long_text_into_ordered_chunks() {
        let server = MockServer::start();
        let first = server.mock(|when, then| {
            when.method(POST)
                .path("/bottest-token/sendMessage")
                .body_includes("\"chat_id\":42")
                .body_includes("first-line");
            then.status(200)
                .json_body(json!({"ok": true, "result": {"message_id": 1}}));
        });
        let second = server.mock(|when, then| {
            when.method(POST)
                .path("/bottest-token/sendMessage")
                .body_includes("second-line");
            then.status(200)
                .json_body(json!({"ok": true, "result": {"message_id": 2}}));
        });

        let text = format!("first-line {}\nsecond-line", "x".repeat(4_080));
        client(&server.base_url())
            .send_message(42, &text)
            .await
            .expect("send");
        first.assert_calls(1);
        second.assert_calls(1);
    }

    #[tokio::test]
    async fn integration_get_updates_parses_messages_and_advances_offset() {
        let server = MockServer::start();
        let updates = server.mock(|when, then| {
            when.method(POST)
                .path("/bottest-token/getUpdates")
                .json_body_includes(json!({"offset": 7, "timeout": 0}).to_string());
            then.status(200).json_body(json!({
                "ok": true,
                "result": [
                    {
                        "update_id": 7,
                        "message": {
                            "message_id": 1,
                            "date": 1700000000,
                            "text": "/links",
                            "chat": {"id": 555, "type": "private"},
                            "from": {"id": 555, "first_name": "Olena", "last_name": "K"}
                        }
                    },
                    {
                        "update_id": 9,
                        "edited_message": {"message_id": 2}
                    }
                ]
            }));
        });

        let batch = client(&server.base_url())
            .get_updates(Some(7), 0)
            .await
            .expect("updates");
        updates.assert_calls(1);
        assert_eq!(batch.next_offset, Some(10));
        assert_eq!(batch.skipped_updates, 1);
        assert_eq!(batch.messages.len(), 1);
        assert_eq!(batch.messages[0].text, "/links");
        assert_eq!(batch.messages[0].requester_name, "Olena K");
    }
}
