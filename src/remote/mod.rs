pub mod telegram_client;
pub mod webhook_update;

pub use telegram_client::{BotApi, BotProfile, TelegramApiError, TelegramClient};
pub use webhook_update::WebhookUpdate;
