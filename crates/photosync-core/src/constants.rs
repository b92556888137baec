//! Constants shared across crates.

/// Service version reported by health and stats endpoints.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Category used when nothing matches or classification is disabled.
pub const DEFAULT_CATEGORY: &str = "Other";

pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// `chrono` format of the per-day directory under the storage root.
pub const DATE_FOLDER_FORMAT: &str = "%Y-%m-%d";

/// `chrono` format of the timestamp prefix on stored file names.
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Directory under the storage root that never counts as a date folder.
pub const LOGS_DIR_NAME: &str = "logs";

/// Extensions (lowercase, without dot) of the legacy image container.
pub const LEGACY_IMAGE_EXTENSIONS: [&str; 2] = ["heic", "heif"];

/// Extension given to normalized images.
pub const NORMALIZED_IMAGE_EXTENSION: &str = "jpg";

/// Telegram refuses `getFile` above this size for bots.
pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 20;

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Header Telegram uses to echo the secret registered with `setWebhook`.
pub const WEBHOOK_SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";
