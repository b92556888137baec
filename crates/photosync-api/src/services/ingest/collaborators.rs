//! Seams to the messaging platform

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use photosync_telegram::BotClient;

/// Retrieves the bytes behind a platform file id
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch(&self, file_id: &str) -> Result<Vec<u8>>;
}

/// Delivers a one-line outcome message to a chat
#[async_trait]
pub trait OutcomeNotifier: Send + Sync {
    async fn notify(&self, chat_id: i64, text: &str) -> Result<()>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[async_trait]
impl MediaFetcher for BotClient {
    async fn fetch(&self, file_id: &str) -> Result<Vec<u8>> {
        Ok(self.fetch_file(file_id).await?)
    }
}

#[async_trait]
impl OutcomeNotifier for BotClient {
    async fn notify(&self, chat_id: i64, text: &str) -> Result<()> {
        self.send_message(chat_id, text).await?;
        Ok(())
    }
}
