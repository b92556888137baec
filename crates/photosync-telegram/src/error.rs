#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    /// Transport failure. The request URL (which embeds the token) is removed.
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Telegram API error ({code:?}): {description}")]
    Api {
        code: Option<i64>,
        description: String,
    },

    #[error("Unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("File {0} has no download path")]
    MissingFilePath(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Client configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for TelegramError {
    fn from(err: reqwest::Error) -> Self {
        TelegramError::Http(err.without_url().to_string())
    }
}
