//! Durable storage of the most recent link batch.

use std::path::{Path, PathBuf};

use invitebot_core::{current_unix_timestamp_ms, write_text_atomic};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::link_batch::{LinkBatch, LinkLabel, LinkOutcome, LinkResult};

pub const LINK_STORE_SCHEMA_VERSION: u32 = 1;
pub const LINK_STORE_FILE_NAME: &str = "links.json";

#[derive(Debug, Error)]
pub enum LinkStoreError {
    #[error("failed to read link store {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse link store {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported link store schema in {path}: expected {expected}, found {found}")]
    UnsupportedSchema {
        path: PathBuf,
        expected: u32,
        found: u32,
    },
    #[error("failed to serialize link store: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to write link store {path}: {source:#}")]
    Write {
        path: PathBuf,
        source: anyhow::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum StoredLinkStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredLinkEntry {
    name: String,
    status: StoredLinkStatus,
    value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredLinkFile {
    schema_version: u32,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    saved_unix_ms: u64,
    #[serde(default)]
    links: Vec<StoredLinkEntry>,
}

impl From<&LinkOutcome> for StoredLinkEntry {
    fn from(outcome: &LinkOutcome) -> Self {
        let status = if outcome.result.is_success() {
            StoredLinkStatus::Ok
        } else {
            StoredLinkStatus::Error
        };
        Self {
            name: outcome.display_name.clone(),
            status,
            value: outcome.result.value().to_string(),
        }
    }
}

impl From<StoredLinkEntry> for LinkOutcome {
    fn from(entry: StoredLinkEntry) -> Self {
        let result = match entry.status {
            StoredLinkStatus::Ok => LinkResult::Success { url: entry.value },
            StoredLinkStatus::Error => LinkResult::Failure {
                reason: entry.value,
            },
        };
        Self {
            display_name: entry.name,
            result,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A loaded batch plus the metadata it was saved with.
pub struct StoredLinkBatch {
    pub label: Option<String>,
    pub saved_unix_ms: u64,
    pub batch: LinkBatch,
}

#[derive(Debug, Clone)]
/// Single-file JSON store holding only the latest batch.
///
/// `save` replaces the file wholesale through an atomic rename. `load` returns
/// `Ok(None)` when nothing was ever saved and an error only for unreadable or
/// malformed state.
pub struct LinkStore {
    path: PathBuf,
}

impl LinkStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn for_state_dir(state_dir: &Path) -> Self {
        Self::new(state_dir.join(LINK_STORE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, label: &LinkLabel, batch: &LinkBatch) -> Result<(), LinkStoreError> {
        let file = StoredLinkFile {
            schema_version: LINK_STORE_SCHEMA_VERSION,
            label: Some(label.as_str().to_string()),
            saved_unix_ms: current_unix_timestamp_ms(),
            links: batch.outcomes().iter().map(StoredLinkEntry::from).collect(),
        };
        let mut payload = serde_json::to_string_pretty(&file).map_err(LinkStoreError::Encode)?;
        payload.push('\n');
        write_text_atomic(&self.path, &payload).map_err(|source| LinkStoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        tracing::info!(
            path = %self.path.display(),
            links = batch.len(),
            "saved link batch"
        );
        Ok(())
    }

    pub fn load(&self) -> Result<Option<StoredLinkBatch>, LinkStoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(LinkStoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let file = serde_json::from_str::<StoredLinkFile>(&raw).map_err(|source| {
            LinkStoreError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;
        if file.schema_version != LINK_STORE_SCHEMA_VERSION {
            return Err(LinkStoreError::UnsupportedSchema {
                path: self.path.clone(),
                expected: LINK_STORE_SCHEMA_VERSION,
                found: file.schema_version,
            });
        }

        Ok(Some(StoredLinkBatch {
            label: file.label.filter(|label| !label.trim().is_empty()),
            saved_unix_ms: file.saved_unix_ms,
            batch: LinkBatch::new(file.links.into_iter().map(LinkOutcome::from).collect()),
        }))
    }
}
