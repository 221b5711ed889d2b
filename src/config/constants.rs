// Project-wide constants
//
// Centralised here so endpoints, ports and other magic values have one
// source of truth. Import via `use crate::config::constants::*;`.

/// Default bind address for `coursesync serve` (localhost only).
pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8000";

/// Groq's OpenAI-compatible endpoint root (the provider appends `/v1/chat/completions`).
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai";

/// Default Groq model.
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";

/// Firecrawl scrape endpoint.
pub const DEFAULT_FIRECRAWL_URL: &str = "https://api.firecrawl.dev/v0/scrape";

/// Maximum tokens requested per completion.
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Sampling temperature for extraction prompts. Low to keep the JSON shape stable.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Timeout for every outbound HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Attempts per model call (first try included).
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Semester start offered when the user gives none.
pub const DEFAULT_SEMESTER_START: &str = "2025-09-01";

/// Name of the data directory under `$HOME`.
pub const DATA_DIR_NAME: &str = ".coursesync";

/// Persisted application state.
pub const STATE_FILE: &str = "data.json";

/// Persisted user settings.
pub const SETTINGS_FILE: &str = "settings.json";

/// Delivered notifications, one JSON object per line.
pub const OUTBOX_FILE: &str = "outbox.jsonl";

/// Body size cap for the web API (PDF uploads included).
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
