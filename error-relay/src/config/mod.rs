//! Environment-driven application configuration.
//!
//! Read once at startup (after `.env` has been loaded) and handed to the
//! components that need it.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::api::server::ApiServerConfig;
use crate::notification::DispatchOptions;
use crate::notification::sinks::{ChatConfig, LogConfig};
use crate::utils::duration::parse_duration;
use crate::utils::text::truncate_then_mark;

pub const DEFAULT_ENVIRONMENT: &str = "development";
pub const DEFAULT_BOT_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";

/// Visible prefix length of a masked webhook URL.
const WEBHOOK_MASK_LEN: usize = 50;

/// Process configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub discord_webhook_url: String,
    pub discord_username: Option<String>,
    pub elk_url: String,
    pub elk_username: Option<String>,
    pub elk_password: Option<String>,
    pub environment: String,
    pub bot_enabled: bool,
    pub bot_interval: Duration,
    pub port: u16,
    pub bind_address: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            discord_webhook_url: String::new(),
            discord_username: None,
            elk_url: String::new(),
            elk_username: None,
            elk_password: None,
            environment: DEFAULT_ENVIRONMENT.to_string(),
            bot_enabled: true,
            bot_interval: DEFAULT_BOT_INTERVAL,
            port: DEFAULT_PORT,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Self::default();

        if let Some(url) = var("DISCORD_WEBHOOK_URL") {
            config.discord_webhook_url = url;
        }
        config.discord_username = var("DISCORD_USERNAME");

        if let Some(url) = var("ELK_URL") {
            config.elk_url = url;
        }
        config.elk_username = var("ELK_USERNAME");
        config.elk_password = var("ELK_PASSWORD");

        if let Some(environment) = var("ENVIRONMENT") {
            config.environment = environment;
        }

        if let Some(interval) = var("BOT_INTERVAL") {
            match parse_duration(&interval) {
                Some(d) if !d.is_zero() => config.bot_interval = d,
                _ => warn!(
                    value = %interval,
                    "Invalid BOT_INTERVAL, using default of {:?}",
                    DEFAULT_BOT_INTERVAL
                ),
            }
        }

        if let Some(enabled) = var("BOT_ENABLED") {
            config.bot_enabled = !matches!(
                enabled.to_ascii_lowercase().as_str(),
                "false" | "0" | "no" | "off"
            );
        }

        if let Some(port) = var("PORT") {
            match port.parse::<u16>() {
                Ok(parsed) => config.port = parsed,
                Err(e) => warn!(value = %port, error = %e, "Invalid PORT, using {}", DEFAULT_PORT),
            }
        }

        if let Some(bind_address) = var("BIND_ADDRESS") {
            config.bind_address = bind_address;
        }

        config.log_dir = var("LOG_DIR").map(PathBuf::from);

        config
    }

    pub fn chat_config(&self) -> ChatConfig {
        ChatConfig {
            webhook_url: self.discord_webhook_url.clone(),
            username: self.discord_username.clone(),
            ..Default::default()
        }
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            url: self.elk_url.clone(),
            username: self.elk_username.clone(),
            password: self.elk_password.clone(),
            environment: self.environment.clone(),
            ..Default::default()
        }
    }

    pub fn dispatch_options(&self) -> DispatchOptions {
        DispatchOptions {
            async_delivery: true,
            include_stack_trace: true,
            environment: Some(self.environment.clone()),
        }
    }

    pub fn server_config(&self) -> ApiServerConfig {
        ApiServerConfig {
            bind_address: self.bind_address.clone(),
            port: self.port,
        }
    }

    /// Base URL the load generator targets (the service itself).
    pub fn self_base_url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }
}

/// Mask a webhook URL for display.
pub fn mask_webhook_url(url: &str) -> String {
    if url.is_empty() {
        return "not configured".to_string();
    }
    truncate_then_mark(url, WEBHOOK_MASK_LEN)
}
