use std::path::Path;
use std::sync::Arc;

use httpmock::prelude::*;
use invitebot_access::{AccessGuard, DenyPolicy};
use invitebot_runtime::{
    Destination, DestinationRegistry, FlowMode, LinkBatch, LinkDispatcher, LinkDispatcherConfig,
    LinkOutcome, LinkPresenter, LinkStore,
};
use invitebot_telegram::{InboundMessage, TelegramApiClient};
use serde_json::json;
use tempfile::tempdir;

const ADMIN_ID: i64 = 42;
const BROADCAST_CHAT_ID: i64 = -1009;

fn dispatcher(base_url: &str, state_dir: &Path) -> LinkDispatcher {
    let client = TelegramApiClient::new(base_url, "test-token", 3_000).expect("client");
    LinkDispatcher::new(
        LinkDispatcherConfig {
            registry: DestinationRegistry::new(vec![
                Destination::new("A", -1001),
                Destination::new("B", -1002),
            ])
            .expect("registry"),
            guard: AccessGuard::new([ADMIN_ID], DenyPolicy::Explicit),
            presenter: LinkPresenter::default(),
            store: LinkStore::for_state_dir(state_dir),
            broadcast_chat_id: Some(BROADCAST_CHAT_ID),
            flow: FlowMode::Conversational,
            max_in_flight: 2,
        },
        Arc::new(client),
    )
}

fn message(update_id: i64, requester_id: i64, text: &str) -> InboundMessage {
    InboundMessage {
        update_id,
        chat_id: requester_id,
        requester_id,
        requester_name: "Taras".to_string(),
        text: text.to_string(),
    }
}

#[tokio::test]
async fn integration_confirmed_batch_creates_links_broadcasts_and_persists() {
    let server = MockServer::start();
    let link_a = server.mock(|when, then| {
        when.method(POST)
            .path("/bottest-token/createChatInviteLink")
            .json_body_includes(
                json!({"chat_id": -1001, "name": "spring", "creates_join_request": true})
                    .to_string(),
            );
        then.status(200).json_body(json!({
            "ok": true,
            "result": {"invite_link": "https://t.me/+abc", "creates_join_request": true}
        }));
    });
    let link_b = server.mock(|when, then| {
        when.method(POST)
            .path("/bottest-token/createChatInviteLink")
            .json_body_includes(json!({"chat_id": -1002}).to_string());
        then.status(400).json_body(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: chat not found"
        }));
    });
    let prompt = server.mock(|when, then| {
        when.method(POST)
            .path("/bottest-token/sendMessage")
            .json_body_includes(json!({"chat_id": ADMIN_ID}).to_string())
            .body_includes("2 channels");
        then.status(200)
            .json_body(json!({"ok": true, "result": {"message_id": 1}}));
    });
    let report = server.mock(|when, then| {
        when.method(POST)
            .path("/bottest-token/sendMessage")
            .json_body_includes(json!({"chat_id": ADMIN_ID}).to_string())
            .body_includes("A - https://t.me/+abc | B - Bad Request: chat not found")
            .body_includes("Created 1 of 2 links.");
        then.status(200)
            .json_body(json!({"ok": true, "result": {"message_id": 2}}));
    });
    let broadcast = server.mock(|when, then| {
        when.method(POST)
            .path("/bottest-token/sendMessage")
            .json_body_includes(
                json!({"chat_id": BROADCAST_CHAT_ID, "disable_web_page_preview": true})
                    .to_string(),
            )
            .body_includes("A - https://t.me/+abc | B - Bad Request: chat not found");
        then.status(200)
            .json_body(json!({"ok": true, "result": {"message_id": 3}}));
    });

    let temp = tempdir().expect("tempdir");
    let mut dispatcher = dispatcher(&server.base_url(), temp.path());
    dispatcher
        .handle_message(&message(1, ADMIN_ID, "/newlink spring"))
        .await
        .expect("newlink");
    link_a.assert_calls(0);
    prompt.assert_calls(1);

    dispatcher
        .handle_message(&message(2, ADMIN_ID, "yes"))
        .await
        .expect("confirm");

    link_a.assert_calls(1);
    link_b.assert_calls(1);
    report.assert_calls(1);
    broadcast.assert_calls(1);

    let stored = LinkStore::for_state_dir(temp.path())
        .load()
        .expect("load")
        .expect("stored batch");
    assert_eq!(stored.label.as_deref(), Some("spring"));
    assert_eq!(
        stored.batch,
        LinkBatch::new(vec![
            LinkOutcome::success("A", "https://t.me/+abc"),
            LinkOutcome::failure("B", "Bad Request: chat not found"),
        ])
    );
}

#[tokio::test]
async fn integration_unauthorized_requester_never_reaches_link_creation() {
    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method(POST).path("/bottest-token/createChatInviteLink");
        then.status(200).json_body(json!({
            "ok": true,
            "result": {"invite_link": "https://t.me/+never"}
        }));
    });
    let denial = server.mock(|when, then| {
        when.method(POST)
            .path("/bottest-token/sendMessage")
            .json_body_includes(json!({"chat_id": 7, "text": "Access denied."}).to_string());
        then.status(200)
            .json_body(json!({"ok": true, "result": {"message_id": 1}}));
    });

    let temp = tempdir().expect("tempdir");
    let mut dispatcher = dispatcher(&server.base_url(), temp.path());
    dispatcher
        .handle_message(&message(1, 7, "/newlink spring"))
        .await
        .expect("denied newlink");
    dispatcher
        .handle_message(&message(2, 7, "/links"))
        .await
        .expect("denied links");

    create.assert_calls(0);
    denial.assert_calls(2);
    assert!(LinkStore::for_state_dir(temp.path())
        .load()
        .expect("load")
        .is_none());
}

#[tokio::test]
async fn integration_links_command_replays_stored_batch_after_restart() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/bottest-token/createChatInviteLink");
        then.status(200).json_body(json!({
            "ok": true,
            "result": {"invite_link": "https://t.me/+same"}
        }));
    });
    let stored_reply = server.mock(|when, then| {
        when.method(POST)
            .path("/bottest-token/sendMessage")
            .json_body_includes(json!({"chat_id": ADMIN_ID}).to_string())
            .body_includes("A - https://t.me/+same | B - https://t.me/+same")
            .body_includes("autumn");
        then.status(200)
            .json_body(json!({"ok": true, "result": {"message_id": 9}}));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/bottest-token/sendMessage")
            .body_includes("2 channels");
        then.status(200)
            .json_body(json!({"ok": true, "result": {"message_id": 1}}));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/bottest-token/sendMessage")
            .json_body_includes(json!({"chat_id": BROADCAST_CHAT_ID}).to_string());
        then.status(200)
            .json_body(json!({"ok": true, "result": {"message_id": 2}}));
    });

    let temp = tempdir().expect("tempdir");
    {
        let mut first = dispatcher(&server.base_url(), temp.path());
        first
            .handle_message(&message(1, ADMIN_ID, "/newlink autumn"))
            .await
            .expect("newlink");
        first
            .handle_message(&message(2, ADMIN_ID, "/confirm"))
            .await
            .expect("confirm");
    }
    stored_reply.assert_calls(1);

    let mut restarted = dispatcher(&server.base_url(), temp.path());
    restarted
        .handle_message(&message(3, ADMIN_ID, "/links"))
        .await
        .expect("links");

    stored_reply.assert_calls(2);
}
