mod error;
mod notifier;
mod telegram;
mod worker;

pub use error::BotError;
pub use notifier::Notifier;
pub use telegram::TelegramApi;
pub use worker::{
    BotParams, BotTransport, BotUpdate, BotUser, BotWorker, OWNER_CONFIG_KEY, notify_channel,
};
