//! HTTP surface constants

/// Prefix for every JSON endpoint
pub const API_PREFIX: &str = "/api/photosync";

/// Webhook payloads are small JSON documents; media is fetched separately.
pub const MAX_WEBHOOK_BODY_BYTES: usize = 1024 * 1024;

/// Concurrent webhook deliveries processed at once
pub const MAX_CONCURRENT_REQUESTS: usize = 64;

pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;
