use std::sync::Arc;

use error_relay::api::{ApiServer, AppState};
use error_relay::bot::LoadGeneratorBot;
use error_relay::config::{AppConfig, mask_webhook_url};
use error_relay::notification::{
    ChatNotifier, LogNotifier, NotificationDispatcher, NotificationSink,
};
use error_relay::services::ServiceContainer;
use error_relay::tracking::Tracker;
use error_relay::{logging, panic_hook, utils};
use tracing::{info, warn};

const BANNER_SEPARATOR: &str = "============================================================";

const ENDPOINTS: &[&str] = &[
    "/health",
    "/api/error/database",
    "/api/error/validation",
    "/api/error/network",
    "/api/error/auth",
    "/api/error/payment",
    "/api/error/panic",
    "/api/error/uncaught-panic",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    let _log_guard = logging::init_logging(config.log_dir.as_deref())?;
    panic_hook::install();
    utils::http_client::install_rustls_provider();

    let log_sink = Arc::new(LogNotifier::new(config.log_config()));
    let chat_sink = Arc::new(ChatNotifier::new(config.chat_config()));
    let sinks: Vec<Arc<dyn NotificationSink>> = vec![chat_sink, log_sink.clone()];

    let dispatcher = Arc::new(NotificationDispatcher::configure(
        sinks,
        config.dispatch_options(),
    ));
    let tracker = Arc::new(Tracker::new(dispatcher, log_sink));

    let state = AppState::new(tracker, ServiceContainer::new());
    let server = ApiServer::new(config.server_config(), state);
    let listener = server.bind().await?;

    let bot = if config.bot_enabled {
        let bot = Arc::new(LoadGeneratorBot::new(
            config.self_base_url(),
            config.bot_interval,
        )?);
        bot.start()?;
        Some(bot)
    } else {
        info!("Load generator bot disabled");
        None
    };

    print_startup_info(&config);

    let cancel_token = server.cancel_token();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutting down server...");
        cancel_token.cancel();
    });

    server.serve(listener).await?;

    if let Some(bot) = bot {
        bot.stop();
    }

    Ok(())
}

fn print_startup_info(config: &AppConfig) {
    info!("{}", BANNER_SEPARATOR);
    info!("Server starting on port {}", config.port);
    info!(
        "ELK URL: {}",
        if config.elk_url.is_empty() {
            "not configured"
        } else {
            config.elk_url.as_str()
        }
    );
    info!(
        "Discord Webhook: {}",
        mask_webhook_url(&config.discord_webhook_url)
    );
    info!("Error Bot interval: {:?}", config.bot_interval);
    info!("Environment: {}", config.environment);
    info!("{}", BANNER_SEPARATOR);
    info!("Available endpoints:");
    for endpoint in ENDPOINTS {
        info!("   GET  {}", endpoint);
    }
    info!("{}", BANNER_SEPARATOR);
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
