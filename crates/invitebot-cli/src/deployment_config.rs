use std::path::Path;

use anyhow::{bail, Context, Result};
use invitebot_access::{AccessGuard, DenyPolicy};
use invitebot_runtime::{
    Destination, DestinationRegistry, FlowMode, LinkDispatcherConfig, LinkPresenter, LinkStore,
    DEFAULT_LINKS_PER_LINE,
};
use serde::Deserialize;

pub(crate) const DEPLOYMENT_CONFIG_SCHEMA_VERSION: u32 = 1;

fn default_links_per_line() -> usize {
    DEFAULT_LINKS_PER_LINE
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
/// Deployment-time description of the channels, administrators and delivery options.
pub(crate) struct DeploymentConfig {
    pub(crate) schema_version: u32,
    pub(crate) destinations: Vec<Destination>,
    #[serde(default)]
    pub(crate) admin_ids: Vec<i64>,
    #[serde(default)]
    pub(crate) broadcast_chat_id: Option<i64>,
    #[serde(default)]
    pub(crate) deny_policy: DenyPolicy,
    #[serde(default)]
    pub(crate) flow: FlowMode,
    #[serde(default = "default_links_per_line")]
    pub(crate) links_per_line: usize,
}

impl DeploymentConfig {
    pub(crate) fn presenter(&self) -> LinkPresenter {
        LinkPresenter::new(self.links_per_line)
    }

    pub(crate) fn into_dispatcher_config(
        self,
        state_dir: &Path,
        max_in_flight: usize,
    ) -> Result<LinkDispatcherConfig> {
        if self.admin_ids.is_empty() {
            tracing::warn!("deployment config lists no admin_ids; every requester will be denied");
        }
        let presenter = self.presenter();
        let registry = DestinationRegistry::new(self.destinations)
            .context("invalid destinations in deployment config")?;
        Ok(LinkDispatcherConfig {
            registry,
            guard: AccessGuard::new(self.admin_ids, self.deny_policy),
            presenter,
            store: LinkStore::for_state_dir(state_dir),
            broadcast_chat_id: self.broadcast_chat_id,
            flow: self.flow,
            max_in_flight,
        })
    }
}

pub(crate) fn parse_deployment_config(raw: &str) -> Result<DeploymentConfig> {
    let config = serde_json::from_str::<DeploymentConfig>(raw)
        .context("failed to parse deployment config")?;
    if config.schema_version != DEPLOYMENT_CONFIG_SCHEMA_VERSION {
        bail!(
            "unsupported deployment config schema_version {} (expected {})",
            config.schema_version,
            DEPLOYMENT_CONFIG_SCHEMA_VERSION
        );
    }
    if config.links_per_line == 0 {
        bail!("deployment config links_per_line must be greater than 0");
    }
    if config.broadcast_chat_id == Some(0) {
        bail!("deployment config broadcast_chat_id cannot be 0");
    }
    Ok(config)
}

pub(crate) fn load_deployment_config(path: &Path) -> Result<DeploymentConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read deployment config {}", path.display()))?;
    parse_deployment_config(&raw)
        .with_context(|| format!("invalid deployment config {}", path.display()))
}
