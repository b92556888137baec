//! photosync-webhook: administration of the Telegram webhook registration.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use photosync_cli::{first_non_empty, init_tracing, print_json, read_config_file};
use photosync_core::config::DEFAULT_CONFIG_PATH;
use photosync_core::constants::DEFAULT_TELEGRAM_API_BASE;
use photosync_telegram::BotClient;

#[derive(Parser)]
#[command(name = "photosync-webhook", about = "Manage the PhotoSync Telegram webhook", version)]
struct Cli {
    /// Bot token (defaults to the config file, then TELEGRAM_BOT_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Path to the JSON configuration file
    #[arg(short, long, global = true, env = "PHOTOSYNC_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register the webhook URL
    Set {
        /// Public HTTPS URL of the webhook endpoint
        #[arg(long)]
        url: Option<String>,
        /// Secret Telegram echoes in the secret-token header
        #[arg(long)]
        secret: Option<String>,
    },
    /// Remove the webhook and drop pending updates
    Delete,
    /// Show the current webhook registration
    Info,
    /// Check the token with getMe
    Test,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = read_config_file(&cli.config)?;

    let env_token = std::env::var("TELEGRAM_BOT_TOKEN").ok();
    let token = first_non_empty([
        cli.token.as_deref(),
        config.bot.token(),
        env_token.as_deref(),
    ])
    .context("No bot token. Pass --token, set bot.token in the config file or TELEGRAM_BOT_TOKEN")?;

    let api_base = if config.bot.api_base.trim().is_empty() {
        DEFAULT_TELEGRAM_API_BASE
    } else {
        config.bot.api_base.as_str()
    };
    let client = BotClient::new(
        api_base,
        &token,
        Duration::from_secs(config.network.download_timeout_secs.max(1)),
    )?;

    match cli.command {
        Commands::Set { url, secret } => {
            let url = first_non_empty([url.as_deref(), config.bot.webhook_url(), None])
                .context("No webhook URL. Pass --url or set bot.webhook_url")?;
            let env_secret = std::env::var("PHOTOSYNC_WEBHOOK_SECRET").ok();
            let secret = first_non_empty([
                secret.as_deref(),
                config.bot.webhook_secret(),
                env_secret.as_deref(),
            ]);

            let ok = client
                .set_webhook(&url, secret.as_deref(), true)
                .await
                .context("setWebhook failed")?;
            print_json(&serde_json::json!({
                "success": ok,
                "url": url,
                "secret_token": secret.is_some(),
            }))?;
        }
        Commands::Delete => {
            let ok = client
                .delete_webhook(true)
                .await
                .context("deleteWebhook failed")?;
            print_json(&serde_json::json!({ "success": ok }))?;
        }
        Commands::Info => {
            let info = client
                .get_webhook_info()
                .await
                .context("getWebhookInfo failed")?;
            print_json(&info)?;
        }
        Commands::Test => {
            let me = client.get_me().await.context("getMe failed")?;
            print_json(&me)?;
        }
    }

    Ok(())
}
