//! Client configuration.
//!
//! The web build has no process environment, so values are baked in at
//! compile time with `option_env!`. Native builds let the runtime
//! environment override them.

use tracing::Level;

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_LOG_LEVEL: &str = "info";

const API_URL_VAR: &str = "MUSICSTREAM_API_URL";
const LOG_LEVEL_VAR: &str = "MUSICSTREAM_LOG";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub log_level: Level,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            log_level: Level::INFO,
        }
    }

    pub fn from_env() -> Self {
        let api_url = lookup(API_URL_VAR, option_env!("MUSICSTREAM_API_URL"))
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let level = lookup(LOG_LEVEL_VAR, option_env!("MUSICSTREAM_LOG"))
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        Self {
            log_level: parse_level(&level),
            ..Self::new(api_url.trim())
        }
    }

    /// Absolute URL for an API path such as `/api/songs`.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn lookup(var: &str, baked: Option<&'static str>) -> Option<String> {
    std::env::var(var)
        .ok()
        .or_else(|| baked.map(str::to_string))
}

#[cfg(target_arch = "wasm32")]
fn lookup(_var: &str, baked: Option<&'static str>) -> Option<String> {
    baked.map(str::to_string)
}

fn parse_level(value: &str) -> Level {
    match value.trim().to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slashes() {
        let config = ClientConfig::new("https://music.example.com/");
        assert_eq!(config.api_base_url, "https://music.example.com");
        assert_eq!(
            config.endpoint("/api/songs"),
            "https://music.example.com/api/songs"
        );
        assert_eq!(
            config.endpoint("api/admin/upload"),
            "https://music.example.com/api/admin/upload"
        );
    }

    #[test]
    fn unknown_log_levels_fall_back_to_info() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level(" warning "), Level::WARN);
        assert_eq!(parse_level("chatty"), Level::INFO);
    }
}
