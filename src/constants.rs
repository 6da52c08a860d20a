//! Shared defaults.

/// Environment variable overriding the backend base URL.
pub const API_URL_ENV: &str = "PROMODESK_API_URL";

/// Environment variable holding the bearer token.
pub const TOKEN_ENV: &str = "PROMODESK_TOKEN";

/// Default config file name, looked up in the current directory.
pub const CONFIG_FILE: &str = "promodesk.toml";

/// Default backend base URL (local development server).
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Default upper bound for a single backend call.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default TCP connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Timeouts above this produce a config warning.
pub const MAX_RECOMMENDED_TIMEOUT_SECS: u64 = 300;

/// Fallback slider header when `/api/settings` is unavailable.
pub const DEFAULT_HEADER_TEXT: &str = "DAILY PK 55 REPORT AND ALL KHABAR";

/// Fallback slider subheader when `/api/settings` is unavailable.
pub const DEFAULT_SUBHEADER_TEXT: &str = "Stay Updated with the Latest News";

/// Minimum vertical travel (in pixels) that counts as a swipe.
pub const SWIPE_THRESHOLD_PX: f64 = 50.0;

/// Pakistan Standard Time offset from UTC, in seconds (no DST).
pub const PKT_OFFSET_SECS: i32 = 5 * 3600;

/// Banner discount shown before noon PKT when the banner endpoint is down.
pub const MORNING_DISCOUNT: u8 = 70;

/// Banner discount shown from noon PKT when the banner endpoint is down.
pub const AFTERNOON_DISCOUNT: u8 = 50;
