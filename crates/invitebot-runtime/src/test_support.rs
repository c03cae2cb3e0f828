//! Scripted messaging platform shared by runtime unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use invitebot_telegram::{InviteLinkRequest, MessagingPlatform, PlatformError};

#[derive(Default)]
pub(crate) struct ScriptedPlatform {
    links: HashMap<i64, Result<String, String>>,
    delays_ms: HashMap<i64, u64>,
    failing_send_chats: HashSet<i64>,
    link_requests: Mutex<Vec<InviteLinkRequest>>,
    sent_messages: Mutex<Vec<(i64, String)>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedPlatform {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_link(mut self, chat_id: i64, url: &str) -> Self {
        self.links.insert(chat_id, Ok(url.to_string()));
        self
    }

    pub(crate) fn with_failure(mut self, chat_id: i64, reason: &str) -> Self {
        self.links.insert(chat_id, Err(reason.to_string()));
        self
    }

    pub(crate) fn with_delay_ms(mut self, chat_id: i64, delay_ms: u64) -> Self {
        self.delays_ms.insert(chat_id, delay_ms);
        self
    }

    pub(crate) fn with_failing_send(mut self, chat_id: i64) -> Self {
        self.failing_send_chats.insert(chat_id);
        self
    }

    pub(crate) fn link_requests(&self) -> Vec<InviteLinkRequest> {
        self.link_requests.lock().expect("link requests lock").clone()
    }

    pub(crate) fn sent_messages(&self) -> Vec<(i64, String)> {
        self.sent_messages.lock().expect("sent messages lock").clone()
    }

    pub(crate) fn messages_to(&self, chat_id: i64) -> Vec<String> {
        self.sent_messages()
            .into_iter()
            .filter(|(target, _)| *target == chat_id)
            .map(|(_, text)| text)
            .collect()
    }

    pub(crate) fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessagingPlatform for ScriptedPlatform {
    async fn create_invite_link(
        &self,
        request: &InviteLinkRequest,
    ) -> Result<String, PlatformError> {
        self.link_requests
            .lock()
            .expect("link requests lock")
            .push(request.clone());
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);
        if let Some(delay_ms) = self.delays_ms.get(&request.chat_id) {
            tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.links.get(&request.chat_id) {
            Some(Ok(url)) => Ok(url.clone()),
            Some(Err(reason)) => Err(PlatformError::Rejected {
                method: "createChatInviteLink",
                error_code: Some(400),
                description: reason.clone(),
            }),
            None => Ok(format!("https://t.me/+scripted{}", request.chat_id.unsigned_abs())),
        }
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), PlatformError> {
        if self.failing_send_chats.contains(&chat_id) {
            return Err(PlatformError::Rejected {
                method: "sendMessage",
                error_code: Some(403),
                description: "Forbidden: bot is not a member of the channel chat".to_string(),
            });
        }
        self.sent_messages
            .lock()
            .expect("sent messages lock")
            .push((chat_id, text.to_string()));
        Ok(())
    }
}
