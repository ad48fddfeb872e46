//! Log-ingestion sink (Elasticsearch / Logstash style HTTP input).

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use super::NotificationSink;
use crate::Result;
use crate::SERVICE_NAME;
use crate::tracking::{Details, ErrorEvent, ErrorLogger, OriginalError, summary_line};
use crate::utils::http_client::build_client;

/// Fields every record carries, in build order. Details are merged after
/// these, so a details key with one of these names replaces the value.
pub const RESERVED_FIELDS: [&str; 8] = [
    "timestamp",
    "error_id",
    "error_type",
    "context",
    "error",
    "service",
    "level",
    "environment",
];

/// Log-ingestion sink configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Ingestion URL. Empty means records are only logged locally.
    pub url: String,
    /// Basic-auth username. Credentials are sent only with both parts set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Environment label written into every record.
    #[serde(default)]
    pub environment: String,
    /// Request timeout.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,
}

fn default_timeout() -> Duration {
    Duration::from_secs(5)
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: None,
            password: None,
            environment: String::new(),
            timeout: default_timeout(),
        }
    }
}

impl LogConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

/// Structured log notification sink.
pub struct LogNotifier {
    config: LogConfig,
    client: Client,
}

impl LogNotifier {
    /// Create a new log-ingestion sink.
    pub fn new(config: LogConfig) -> Self {
        let client = build_client(config.timeout);
        Self { config, client }
    }

    /// Build the flat record for an event.
    pub fn build_record(&self, event: &ErrorEvent, now: DateTime<Utc>) -> Map<String, Value> {
        let environment = event
            .environment_label()
            .unwrap_or(self.config.environment.as_str());

        let mut record = Map::new();
        record.insert(
            "timestamp".into(),
            now.to_rfc3339_opts(SecondsFormat::Secs, true).into(),
        );
        record.insert("error_id".into(), event.id.clone().into());
        record.insert("error_type".into(), "tracked".into());
        record.insert("context".into(), event.context.clone().into());
        record.insert("error".into(), event.original.message.clone().into());
        record.insert("service".into(), SERVICE_NAME.into());
        record.insert("level".into(), "error".into());
        record.insert("environment".into(), environment.into());

        for (key, value) in &event.details {
            record.insert(key.clone(), value.clone());
        }

        record
    }

    /// Build the POST request for a record.
    pub fn build_request(&self, record: &Map<String, Value>) -> RequestBuilder {
        let mut request = self.client.post(&self.config.url).json(record);

        let username = self.config.username.as_deref().filter(|u| !u.is_empty());
        let password = self.config.password.as_deref().filter(|p| !p.is_empty());
        if let (Some(username), Some(password)) = (username, password) {
            request = request.basic_auth(username, Some(password));
        }

        request
    }
}

impl ErrorLogger for LogNotifier {
    fn info(&self, message: &str) {
        info!("{message}");
    }

    fn error(&self, error_id: &str, error: &OriginalError, context: &str, details: &Details) {
        error!(
            error_id,
            detail_count = details.len(),
            "{}",
            summary_line(error_id, context, error)
        );
    }
}

#[async_trait]
impl NotificationSink for LogNotifier {
    fn sink_type(&self) -> &'static str {
        "log"
    }

    fn is_enabled(&self) -> bool {
        !self.config.url.is_empty()
    }

    fn record_locally(&self, event: &ErrorEvent) {
        ErrorLogger::error(self, &event.id, &event.original, &event.context, &event.details);
    }

    async fn send(&self, event: &ErrorEvent) -> Result<()> {
        if !self.is_enabled() {
            debug!(error_id = %event.id, "Log ingestion URL not configured, skipping");
            return Ok(());
        }

        let record = self.build_record(event, Utc::now());

        let response = self
            .build_request(&record)
            .send()
            .await
            .map_err(|e| crate::Error::Other(format!("Log ingestion request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            warn!(error_id = %event.id, status = %status, "Log ingestion returned error status");
            return Err(crate::Error::Other(format!(
                "Log ingestion returned error status: {}",
                status
            )));
        }

        debug!(error_id = %event.id, "Structured error record shipped");
        Ok(())
    }
}
