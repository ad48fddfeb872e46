//! Load-generator bot.
//!
//! Periodically calls a random error-simulation endpoint of the service
//! itself so the tracking and notification pipeline keeps running.
//! Failures never leave the bot's own loop.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rand::Rng;
use rand::seq::IndexedRandom;
use reqwest::Client;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::utils::http_client::build_client;
use crate::{Error, Result};

/// Endpoints the bot picks from.
pub const ERROR_ENDPOINTS: &[&str] = &[
    "/api/error/database",
    "/api/error/validation",
    "/api/error/network",
    "/api/error/auth",
    "/api/error/payment",
    "/api/error/panic",
];

/// Takes the whole process down; never part of the pool.
pub const UNCAUGHT_PANIC_ENDPOINT: &str = "/api/error/uncaught-panic";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Bot lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotState {
    Created,
    Running,
    Stopped,
}

impl fmt::Display for BotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Result of a single hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitOutcome {
    /// The endpoint answered with an error status, as intended.
    TriggeredError(u16),
    /// The endpoint answered below 400.
    UnexpectedSuccess(u16),
    /// No response at all.
    TransportFailed(String),
}

impl HitOutcome {
    pub fn from_status(status: u16) -> Self {
        if status >= 400 {
            Self::TriggeredError(status)
        } else {
            Self::UnexpectedSuccess(status)
        }
    }
}

/// Pick one endpoint uniformly at random.
pub fn pick_endpoint<'a, R>(endpoints: &[&'a str], rng: &mut R) -> Option<&'a str>
where
    R: Rng + ?Sized,
{
    endpoints.choose(rng).copied()
}

/// Scheduled load generator.
pub struct LoadGeneratorBot {
    base_url: String,
    interval: Duration,
    endpoints: Vec<&'static str>,
    client: Client,
    state: Mutex<BotState>,
    cancel_token: CancellationToken,
}

impl LoadGeneratorBot {
    pub fn new(base_url: impl Into<String>, interval: Duration) -> Result<Self> {
        Self::with_endpoints(base_url, interval, ERROR_ENDPOINTS.to_vec())
    }

    /// Create a bot over a custom endpoint pool.
    pub fn with_endpoints(
        base_url: impl Into<String>,
        interval: Duration,
        endpoints: Vec<&'static str>,
    ) -> Result<Self> {
        if interval.is_zero() {
            return Err(Error::config("bot interval must be greater than zero"));
        }
        if endpoints.is_empty() {
            return Err(Error::config("bot needs at least one endpoint"));
        }

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            interval,
            endpoints,
            client: build_client(REQUEST_TIMEOUT),
            state: Mutex::new(BotState::Created),
            cancel_token: CancellationToken::new(),
        })
    }

    pub fn state(&self) -> BotState {
        *self.state.lock()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start the loop: one hit right away, then one per interval.
    ///
    /// Only a freshly created bot can be started.
    pub fn start(self: &Arc<Self>) -> Result<JoinHandle<()>> {
        {
            let mut state = self.state.lock();
            if *state != BotState::Created {
                return Err(Error::invalid_transition(*state, BotState::Running));
            }
            *state = BotState::Running;
        }

        let bot = Arc::clone(self);
        Ok(tokio::spawn(async move {
            info!(
                "Load generator bot started, hitting endpoints every {:?}",
                bot.interval
            );
            bot.run_loop().await;
            info!("Load generator bot stopped");
        }))
    }

    /// Stop the bot. Returns whether this call performed the transition.
    ///
    /// An in-flight request is not cancelled; only future ticks are.
    pub fn stop(&self) -> bool {
        let mut state = self.state.lock();
        if *state == BotState::Stopped {
            return false;
        }
        *state = BotState::Stopped;
        self.cancel_token.cancel();
        true
    }

    async fn run_loop(&self) {
        self.hit_random_endpoint().await;

        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = self.cancel_token.cancelled() => break,
                _ = ticker.tick() => {
                    self.hit_random_endpoint().await;
                }
            }
        }
    }

    /// Hit one random endpoint from the pool.
    pub async fn hit_random_endpoint(&self) -> HitOutcome {
        let endpoint = pick_endpoint(&self.endpoints, &mut rand::rng()).unwrap_or(ERROR_ENDPOINTS[0]);
        self.hit(endpoint).await
    }

    /// Hit `endpoint` and classify the answer.
    pub async fn hit(&self, endpoint: &str) -> HitOutcome {
        let url = format!("{}{}", self.base_url, endpoint);
        info!(endpoint, "Bot hitting endpoint");

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(endpoint, error = %e, "Bot request failed");
                return HitOutcome::TransportFailed(e.to_string());
            }
        };

        let status = response.status().as_u16();
        let outcome = HitOutcome::from_status(status);
        match outcome {
            HitOutcome::TriggeredError(_) => {
                let body = response.text().await.unwrap_or_default();
                info!(endpoint, status, "Bot triggered error");
                debug!(endpoint, "Response: {}", body);
            }
            _ => warn!(endpoint, status, "Bot expected an error but didn't get one"),
        }
        outcome
    }
}
