//! Batch invite-link provisioning for a fixed set of Telegram channels.
//!
//! Holds the destination registry, the batch provisioner, the link store, the
//! report presenter, the per-requester conversation state machine and the
//! dispatcher and polling loop that tie them to inbound bot commands.

pub mod batch_provisioner;
pub mod bot_commands;
pub mod bot_runtime;
pub mod conversation;
pub mod destination_registry;
pub mod link_batch;
pub mod link_dispatcher;
pub mod link_presenter;
pub mod link_store;

#[cfg(test)]
mod test_support;

pub use batch_provisioner::*;
pub use bot_commands::*;
pub use bot_runtime::*;
pub use conversation::*;
pub use destination_registry::*;
pub use link_batch::*;
pub use link_dispatcher::*;
pub use link_presenter::*;
pub use link_store::*;
