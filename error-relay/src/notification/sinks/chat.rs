//! Discord-compatible chat webhook sink.
//!
//! Every text placed in the embed is bounded to what the chat platform
//! accepts, so a single oversized event can never get the whole message
//! rejected.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::NotificationSink;
use crate::Result;
use crate::tracking::{Details, ErrorEvent};
use crate::utils::http_client::build_client;
use crate::utils::text::{truncate_hard, truncate_then_mark, truncate_with_ellipsis};

/// Maximum embed title length.
pub const TITLE_LIMIT: usize = 256;
/// Maximum embed description length.
pub const DESCRIPTION_LIMIT: usize = 2048;
/// Maximum embed field value length.
pub const FIELD_VALUE_LIMIT: usize = 1024;
/// Stack traces are cut well below the field limit to leave room for the code fence.
pub const STACK_TRACE_LIMIT: usize = 900;
/// Embed color for errors (red).
pub const ERROR_COLOR: u32 = 0xe74c3c;

/// Chat sink configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Webhook URL. Empty means the sink is not configured.
    pub webhook_url: String,
    /// Optional username for the webhook.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Request timeout.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            username: None,
            timeout: default_timeout(),
        }
    }
}

/// Webhook message body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub embeds: Vec<Embed>,
}

/// A single rich embed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    pub timestamp: String,
}

impl Embed {
    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&EmbedField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Chat webhook notification sink.
pub struct ChatNotifier {
    config: ChatConfig,
    client: Client,
}

impl ChatNotifier {
    /// Create a new chat sink.
    pub fn new(config: ChatConfig) -> Self {
        let client = build_client(config.timeout);
        Self { config, client }
    }

    /// Build the webhook message for an event.
    pub fn build_message(&self, event: &ErrorEvent) -> ChatMessage {
        let description = format!(
            "Error: {}\nContext: {}",
            event.original.message, event.context
        );

        let mut fields = Vec::new();

        if !event.details.is_empty() {
            fields.push(EmbedField {
                name: "Details".to_string(),
                value: truncate_with_ellipsis(&format_details(&event.details), FIELD_VALUE_LIMIT),
                inline: false,
            });
        }

        if let Some(environment) = event.environment_label() {
            fields.push(EmbedField {
                name: "Environment".to_string(),
                value: environment.to_string(),
                inline: true,
            });
        }

        if let Some(trace) = event.stack_trace_text() {
            fields.push(EmbedField {
                name: "Stack Trace".to_string(),
                value: format!("```\n{}\n```", truncate_then_mark(trace, STACK_TRACE_LIMIT)),
                inline: false,
            });
        }

        let embed = Embed {
            title: truncate_with_ellipsis(&format!("Error: {}", event.id), TITLE_LIMIT),
            description: truncate_hard(&description, DESCRIPTION_LIMIT).to_string(),
            color: ERROR_COLOR,
            fields,
            timestamp: event.occurred_at.to_rfc3339(),
        };

        ChatMessage {
            username: self.config.username.clone(),
            embeds: vec![embed],
        }
    }
}

/// Render details as one `• key: value` line per entry.
pub fn format_details(details: &Details) -> String {
    details
        .iter()
        .map(|(key, value)| format!("• {}: {}\n", key, render_value(value)))
        .collect()
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl NotificationSink for ChatNotifier {
    fn sink_type(&self) -> &'static str {
        "chat"
    }

    fn is_enabled(&self) -> bool {
        !self.config.webhook_url.is_empty()
    }

    async fn send(&self, event: &ErrorEvent) -> Result<()> {
        if !self.is_enabled() {
            info!(error_id = %event.id, "Chat webhook URL not configured, skipping notification");
            return Ok(());
        }

        let message = self.build_message(event);

        let response = self
            .client
            .post(&self.config.webhook_url)
            .json(&message)
            .send()
            .await
            .map_err(|e| crate::Error::Other(format!("Chat webhook request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Chat webhook failed: {} - {}", status, body);
            return Err(crate::Error::Other(format!(
                "Chat webhook returned error status: {}",
                status
            )));
        }

        debug!(title = %message.embeds[0].title, "Error notification sent to chat webhook");
        Ok(())
    }
}
