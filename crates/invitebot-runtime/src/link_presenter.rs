//! Plain-text rendering of link batches and conversation prompts.

use crate::link_batch::{LinkBatch, LinkOutcome};

pub const DEFAULT_LINKS_PER_LINE: usize = 3;
const ENTRY_SEPARATOR: &str = " | ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Deterministic renderer: the same input always yields the same text.
pub struct LinkPresenter {
    links_per_line: usize,
}

impl Default for LinkPresenter {
    fn default() -> Self {
        Self::new(DEFAULT_LINKS_PER_LINE)
    }
}

impl LinkPresenter {
    pub fn new(links_per_line: usize) -> Self {
        Self {
            links_per_line: links_per_line.max(1),
        }
    }

    pub fn links_per_line(&self) -> usize {
        self.links_per_line
    }

    /// Renders outcomes `links_per_line` to a line, in batch order, optionally
    /// headed by the batch label.
    pub fn render_report(&self, batch: &LinkBatch, label: Option<&str>) -> String {
        let body = batch
            .outcomes()
            .chunks(self.links_per_line)
            .map(|cluster| {
                cluster
                    .iter()
                    .map(render_entry)
                    .collect::<Vec<_>>()
                    .join(ENTRY_SEPARATOR)
            })
            .collect::<Vec<_>>()
            .join("\n");
        match label.map(str::trim).filter(|label| !label.is_empty()) {
            Some(label) => format!("Invite links \"{label}\":\n\n{body}"),
            None => body,
        }
    }

    pub fn render_summary(&self, batch: &LinkBatch) -> String {
        format!(
            "Created {} of {} links.",
            batch.success_count(),
            batch.len()
        )
    }

    pub fn render_empty(&self) -> String {
        "No invite links have been created yet.".to_string()
    }

    pub fn render_label_prompt(&self) -> String {
        "Send a label for the new invite links, or /cancel to stop.".to_string()
    }

    pub fn render_confirmation_prompt(&self, label: &str, destination_count: usize) -> String {
        format!(
            "Create join-request invite links for {destination_count} channels with label \"{label}\"?\nReply \"yes\" to confirm or \"no\" to cancel."
        )
    }

    pub fn render_cancelled(&self) -> String {
        "Cancelled. No links were created.".to_string()
    }

    pub fn render_nothing_to_cancel(&self) -> String {
        "Nothing to cancel.".to_string()
    }

    pub fn render_access_denied(&self) -> String {
        "Access denied.".to_string()
    }

    pub fn render_save_failed(&self, error: &str) -> String {
        format!("Warning: links were created but could not be saved: {error}")
    }

    pub fn render_load_failed(&self, error: &str) -> String {
        format!("Failed to read stored links: {error}")
    }

    pub fn render_broadcast_failed(&self, error: &str) -> String {
        format!("Warning: failed to publish links to the broadcast channel: {error}")
    }

    pub fn render_unknown_command(&self, name: &str) -> String {
        format!("Unknown command /{name}.\n\n{}", self.render_usage())
    }

    pub fn render_usage(&self) -> String {
        [
            "Supported commands:",
            "/newlink [label] - create invite links for every channel",
            "/links - show the most recently created links",
            "/cancel - cancel a pending /newlink",
            "/help - show this message",
        ]
        .join("\n")
    }
}

fn render_entry(outcome: &LinkOutcome) -> String {
    format!("{} - {}", outcome.display_name, outcome.result.value())
}
