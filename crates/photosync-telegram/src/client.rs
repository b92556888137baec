use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::TelegramError;
use crate::types::{ApiResponse, Message, TelegramFile, User, WebhookInfo};

const MAX_ERROR_BODY_CHARS: usize = 200;

/// HTTP client for one bot.
///
/// Error messages never include request URLs, since every Bot API URL embeds
/// the token.
#[derive(Clone)]
pub struct BotClient {
    client: Client,
    api_base: String,
    token: String,
}

impl std::fmt::Debug for BotClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl BotClient {
    pub fn new(api_base: &str, token: &str, timeout: Duration) -> Result<Self, TelegramError> {
        if token.trim().is_empty() {
            return Err(TelegramError::Config("bot token is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TelegramError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.trim().to_string(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    fn file_url(&self, file_path: &str) -> String {
        format!(
            "{}/file/bot{}/{}",
            self.api_base,
            self.token,
            file_path.trim_start_matches('/')
        )
    }

    /// Send a Bot API request and unwrap the `{ ok, result }` envelope.
    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, TelegramError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        let envelope: ApiResponse<T> = match serde_json::from_slice(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(TelegramError::Status {
                    status: status.as_u16(),
                    body: truncate(&String::from_utf8_lossy(&body)),
                })
            }
            Err(e) => return Err(TelegramError::InvalidResponse(e.to_string())),
        };

        if !envelope.ok {
            return Err(TelegramError::Api {
                code: envelope.error_code,
                description: envelope.description.unwrap_or_default(),
            });
        }

        envelope
            .result
            .ok_or_else(|| TelegramError::InvalidResponse("missing result".to_string()))
    }

    /// Resolve a file id to its transient download path.
    pub async fn get_file(&self, file_id: &str) -> Result<TelegramFile, TelegramError> {
        let request = self
            .client
            .get(self.method_url("getFile"))
            .query(&[("file_id", file_id)]);
        self.call(request).await
    }

    pub async fn download(&self, file_path: &str) -> Result<Vec<u8>, TelegramError> {
        let response = self.client.get(self.file_url(file_path)).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TelegramError::Status {
                status: status.as_u16(),
                body: truncate(&body),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// `getFile` followed by the download of the returned path.
    pub async fn fetch_file(&self, file_id: &str) -> Result<Vec<u8>, TelegramError> {
        let file = self.get_file(file_id).await?;
        let path = file
            .file_path
            .ok_or_else(|| TelegramError::MissingFilePath(file_id.to_string()))?;
        let bytes = self.download(&path).await?;
        tracing::debug!(file_id = %file_id, size_bytes = bytes.len(), "File downloaded");
        Ok(bytes)
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<Message, TelegramError> {
        let request = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&json!({ "chat_id": chat_id, "text": text }));
        self.call(request).await
    }

    /// Register `url` for `message` updates only.
    pub async fn set_webhook(
        &self,
        url: &str,
        secret: Option<&str>,
        drop_pending_updates: bool,
    ) -> Result<bool, TelegramError> {
        let mut params = json!({
            "url": url,
            "allowed_updates": ["message"],
            "drop_pending_updates": drop_pending_updates,
        });
        if let Some(secret) = secret.filter(|s| !s.is_empty()) {
            params["secret_token"] = json!(secret);
        }
        let request = self.client.post(self.method_url("setWebhook")).json(&params);
        self.call(request).await
    }

    pub async fn delete_webhook(&self, drop_pending_updates: bool) -> Result<bool, TelegramError> {
        let request = self
            .client
            .post(self.method_url("deleteWebhook"))
            .json(&json!({ "drop_pending_updates": drop_pending_updates }));
        self.call(request).await
    }

    pub async fn get_webhook_info(&self) -> Result<WebhookInfo, TelegramError> {
        self.call(self.client.get(self.method_url("getWebhookInfo")))
            .await
    }

    pub async fn get_me(&self) -> Result<User, TelegramError> {
        self.call(self.client.get(self.method_url("getMe"))).await
    }
}

fn truncate(body: &str) -> String {
    body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect()
}
