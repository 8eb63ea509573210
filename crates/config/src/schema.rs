/// Config schema types (discord, completion, chat, history, server).
use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Default persona sent as the system turn of every request.
pub const DEFAULT_SYSTEM_PROMPT: &str = "あなたはtoxic aiです。あなたはDiscordサーバーに常駐する「口が悪いけど憎めないtoxic bot」。基本スタンスはフレンドリーで距離感ゼロ、初対面でもタメ口。人を傷つけるガチ攻撃はしないが、軽口・煽り・自虐・雑なツッコミは大好物。";

pub const DEFAULT_MODEL: &str = "openai/gpt-oss-120b:free";
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub discord: DiscordConfig,
    pub completion: CompletionConfig,
    pub chat: ChatConfig,
    pub history: HistoryConfig,
    pub server: ServerConfig,
}

/// Discord bot account settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Bot token from the Discord developer portal.
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,

    /// Prefix that marks a control command, e.g. `!channel`.
    pub command_prefix: String,
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("token", &"[REDACTED]")
            .field("command_prefix", &self.command_prefix)
            .finish()
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
            command_prefix: "!".into(),
        }
    }
}

/// OpenAI-compatible completion endpoint settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    #[serde(serialize_with = "serialize_secret")]
    pub api_key: Secret<String>,

    /// Base URL without the trailing `/chat/completions`.
    pub base_url: String,

    /// Model identifier passed verbatim in the request body.
    pub model: String,

    /// Upper bound for one completion round trip.
    pub timeout_secs: u64,

    /// Sent as `HTTP-Referer` (OpenRouter attribution). Empty disables the header.
    pub referer: String,

    /// Sent as `X-Title` (OpenRouter attribution). Empty disables the header.
    pub title: String,
}

impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: Secret::new(String::new()),
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            timeout_secs: 60,
            referer: "https://discord.com".into(),
            title: "My Discord Bot".into(),
        }
    }
}

impl CompletionConfig {
    #[must_use]
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

/// Reply wording.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub system_prompt: String,

    /// Prepended to the error detail when a completion fails.
    pub error_prefix: String,

    /// Sent (and stored) when the service answers with empty content.
    pub empty_reply_placeholder: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            error_prefix: "エラーが発生しました: ".into(),
            empty_reply_placeholder: "（返事が空っぽだったわ）".into(),
        }
    }
}

/// Per-channel window sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Number of user/assistant exchanges kept per channel.
    pub max_exchanges: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_exchanges: 10 }
    }
}

impl HistoryConfig {
    /// Window capacity in turns (two per exchange).
    #[must_use]
    pub fn window_turns(&self) -> usize {
        self.max_exchanges.saturating_mul(2)
    }
}

/// Liveness endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".into(),
            port: 8080,
        }
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}
