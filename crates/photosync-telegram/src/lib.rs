//! Telegram Bot API client.
//!
//! Covers what PhotoSync needs from the platform: the two-step file download
//! (`getFile`, then the file endpoint), chat notifications and webhook
//! administration. Payload types mirror the JSON Telegram sends to a webhook.

mod client;
mod error;
pub mod types;

pub use client::BotClient;
pub use error::TelegramError;
pub use types::{
    Attachment, Chat, Message, PhotoSize, TelegramFile, Update, User, WebhookInfo,
};
