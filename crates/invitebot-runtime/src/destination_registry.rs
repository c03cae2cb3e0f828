use std::collections::HashSet;

use anyhow::{bail, Result};

use crate::link_batch::Destination;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Fixed, ordered set of destinations loaded once at startup.
///
/// Order drives both provisioning order and report grouping.
pub struct DestinationRegistry {
    destinations: Vec<Destination>,
}

impl DestinationRegistry {
    pub fn new(destinations: Vec<Destination>) -> Result<Self> {
        if destinations.is_empty() {
            bail!("destination registry requires at least one destination");
        }
        let mut seen_ids = HashSet::with_capacity(destinations.len());
        for (index, destination) in destinations.iter().enumerate() {
            if destination.display_name.trim().is_empty() {
                bail!("destination #{index} has an empty name");
            }
            if !seen_ids.insert(destination.platform_id) {
                bail!(
                    "destination '{}' reuses chat id {}",
                    destination.display_name,
                    destination.platform_id
                );
            }
        }
        Ok(Self { destinations })
    }

    pub fn list(&self) -> &[Destination] {
        &self.destinations
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }
}
