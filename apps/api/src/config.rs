use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub marketplace_graphql_url: String,
    pub backend_base_url: String,
    pub backend_tokens_path: String,
    pub backend_cookies_path: String,
    pub backend_profile_save_path: String,
    pub backend_bid_save_path: String,
    pub bid_proxy_url: String,
    pub openai_api_url: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub request_timeout: Duration,
    pub persona: PersonaDefaults,
    pub port: u16,
    pub rust_log: String,
}

/// Voice used for generated proposals unless a draft request overrides it.
#[derive(Debug, Clone)]
pub struct PersonaDefaults {
    pub name: String,
    pub target_words: u32,
    pub instruction: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let timeout_secs = optional_env("REQUEST_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .context("REQUEST_TIMEOUT_SECS must be a whole number of seconds")?;

        Ok(Config {
            marketplace_graphql_url: optional_env(
                "MARKETPLACE_GRAPHQL_URL",
                "https://www.upwork.com/api/graphql/v1",
            ),
            backend_base_url: require_env("BACKEND_BASE_URL")?,
            backend_tokens_path: optional_env("BACKEND_TOKENS_PATH", "upwork/tokens.php"),
            backend_cookies_path: optional_env("BACKEND_COOKIES_PATH", "upwork/cookies.php"),
            backend_profile_save_path: optional_env(
                "BACKEND_PROFILE_SAVE_PATH",
                "upwork/save_profile.php",
            ),
            backend_bid_save_path: optional_env("BACKEND_BID_SAVE_PATH", "save-bid.php"),
            bid_proxy_url: require_env("BID_PROXY_URL")?,
            openai_api_url: optional_env(
                "OPENAI_API_URL",
                "https://api.openai.com/v1/chat/completions",
            ),
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_model: optional_env("OPENAI_MODEL", "gpt-3.5-turbo"),
            request_timeout: Duration::from_secs(timeout_secs),
            persona: PersonaDefaults {
                name: optional_env("BID_PERSONA_NAME", "Freelancer"),
                target_words: optional_env("BID_TARGET_WORDS", "150")
                    .parse::<u32>()
                    .context("BID_TARGET_WORDS must be a positive number")?,
                instruction: optional_env(
                    "BID_INSTRUCTION",
                    "Write a professional and persuasive bid that highlights relevant skills and experience.",
                ),
            },
            port: optional_env("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
impl Config {
    /// Local placeholder endpoints; nothing listens on them.
    pub fn for_tests() -> Self {
        Config {
            marketplace_graphql_url: "http://127.0.0.1:9/graphql".to_string(),
            backend_base_url: "http://127.0.0.1:9".to_string(),
            backend_tokens_path: "upwork/tokens.php".to_string(),
            backend_cookies_path: "upwork/cookies.php".to_string(),
            backend_profile_save_path: "upwork/save_profile.php".to_string(),
            backend_bid_save_path: "save-bid.php".to_string(),
            bid_proxy_url: "http://127.0.0.1:9/bid".to_string(),
            openai_api_url: "http://127.0.0.1:9/chat".to_string(),
            openai_api_key: "test-key".to_string(),
            openai_model: "gpt-3.5-turbo".to_string(),
            request_timeout: Duration::from_secs(1),
            persona: PersonaDefaults {
                name: "Freelancer".to_string(),
                target_words: 150,
                instruction: "a professional tone".to_string(),
            },
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}
