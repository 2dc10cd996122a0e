//! Gateway configuration, loaded from environment variables at startup.

pub const DEFAULT_API_URL: &str = "https://api.deepseek.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Which [`HistoryStore`](crate::services::history_store::HistoryStore) backs the resolvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryBackend {
    /// Fixed read-only sample conversation.
    Sample,
    /// Process-local key-value store.
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// Provider secret. `None` when unset or empty; `sendMessage` then fails
    /// with a configuration error instead of the server refusing to start.
    pub api_key: Option<String>,

    pub api_url: String,
    pub model: String,

    /// Language the system prompt asks the model to reply in.
    pub reply_language: String,

    /// Value sent in `Access-Control-Allow-Origin`.
    pub cors_allow_origin: String,

    pub history_backend: HistoryBackend,

    /// `tracing` filter string, used when `RUST_LOG` is unset.
    pub log_level: String,
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_owned(),
            api_key: None,
            api_url: DEFAULT_API_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            reply_language: "Chinese".to_owned(),
            cors_allow_origin: "*".to_owned(),
            history_backend: HistoryBackend::Sample,
            log_level: "info".to_owned(),
            log_json: false,
        }
    }
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_address: env_or("GATEWAY_BIND", &defaults.bind_address),
            api_key: std::env::var("DEEPSEEK_API_KEY")
                .ok()
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty()),
            api_url: env_or("DEEPSEEK_API_URL", &defaults.api_url),
            model: env_or("DEEPSEEK_MODEL", &defaults.model),
            reply_language: env_or("REPLY_LANGUAGE", &defaults.reply_language),
            cors_allow_origin: env_or("CORS_ALLOW_ORIGIN", &defaults.cors_allow_origin),
            history_backend: match env_or("CHAT_HISTORY", "sample").to_lowercase().as_str() {
                "memory" => HistoryBackend::Memory,
                _ => HistoryBackend::Sample,
            },
            log_level: env_or("GATEWAY_LOG", &defaults.log_level),
            log_json: std::env::var("GATEWAY_LOG_JSON")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }

    /// Same configuration with the provider secret set.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}
