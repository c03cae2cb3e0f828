//! Telegram Bot API transport for invitebot.
//!
//! [`MessagingPlatform`] is the seam the provisioning runtime talks to;
//! [`TelegramApiClient`] is its HTTP implementation and also exposes the
//! long-polling `getUpdates` call used by the bot loop.

pub mod messaging_platform;
pub mod telegram_api_client;
pub mod telegram_helpers;
pub mod telegram_updates;

pub use messaging_platform::*;
pub use telegram_api_client::*;
pub use telegram_helpers::*;
pub use telegram_updates::*;
