//! Per-destination invite-link creation with partial-failure tolerance.

use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use invitebot_telegram::{InviteLinkRequest, MessagingPlatform};

use crate::link_batch::{Destination, LinkBatch, LinkLabel, LinkOutcome};

pub const DEFAULT_MAX_IN_FLIGHT: usize = 1;

#[derive(Clone)]
/// Requests one join-request-gated, non-expiring invite link per destination.
///
/// A failed call is recorded as a failure outcome and the batch moves on; the
/// returned batch always holds exactly one outcome per destination in input
/// order, whatever order the calls complete in.
pub struct BatchProvisioner {
    platform: Arc<dyn MessagingPlatform>,
    max_in_flight: usize,
}

impl BatchProvisioner {
    pub fn new(platform: Arc<dyn MessagingPlatform>, max_in_flight: usize) -> Self {
        Self {
            platform,
            max_in_flight: max_in_flight.max(1),
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    pub async fn run(&self, label: &LinkLabel, destinations: &[Destination]) -> LinkBatch {
        tracing::info!(
            label = %label,
            destinations = destinations.len(),
            max_in_flight = self.max_in_flight,
            "starting invite link batch"
        );

        let mut slots: Vec<Option<LinkOutcome>> = vec![None; destinations.len()];
        let mut completions = stream::iter(destinations.iter().enumerate())
            .map(|(index, destination)| async move {
                (index, self.provision_destination(label, destination).await)
            })
            .buffer_unordered(self.max_in_flight);
        while let Some((index, outcome)) = completions.next().await {
            slots[index] = Some(outcome);
        }

        let outcomes = slots
            .into_iter()
            .zip(destinations)
            .map(|(slot, destination)| {
                slot.unwrap_or_else(|| {
                    LinkOutcome::failure(
                        destination.display_name.clone(),
                        "invite link request was not attempted",
                    )
                })
            })
            .collect::<Vec<_>>();
        let batch = LinkBatch::new(outcomes);
        tracing::info!(
            label = %label,
            ok = batch.success_count(),
            failed = batch.failure_count(),
            "finished invite link batch"
        );
        batch
    }

    async fn provision_destination(
        &self,
        label: &LinkLabel,
        destination: &Destination,
    ) -> LinkOutcome {
        let request =
            InviteLinkRequest::join_request_gated(destination.platform_id, label.as_str());
        match self.platform.create_invite_link(&request).await {
            Ok(url) => LinkOutcome::success(destination.display_name.clone(), url),
            Err(error) => {
                tracing::warn!(
                    destination = %destination.display_name,
                    chat_id = destination.platform_id,
                    method = error.method(),
                    error = %error,
                    "invite link creation failed"
                );
                LinkOutcome::failure(destination.display_name.clone(), error.to_string())
            }
        }
    }
}
