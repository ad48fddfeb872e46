use std::{sync::OnceLock, time::Duration};

use tracing::{debug, warn};

pub fn install_rustls_provider() {
    static PROVIDER_INSTALLED: OnceLock<()> = OnceLock::new();
    PROVIDER_INSTALLED.get_or_init(|| {
        if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
            // Safe to ignore: can happen if another crate installed it first.
            debug!(existing_provider = ?e, "rustls CryptoProvider already installed");
        }
    });
}

/// Build a `reqwest::Client` whose every request is bounded by `request_timeout`.
///
/// The client is cheap to clone and safe to share across concurrent
/// deliveries; it is built once per sink (or bot) and never mutated.
pub fn build_client(request_timeout: Duration) -> reqwest::Client {
    install_rustls_provider();

    let mut builder = reqwest::Client::builder();
    if request_timeout > Duration::ZERO {
        builder = builder.timeout(request_timeout);
    }

    builder.build().unwrap_or_else(|error| {
        warn!(
            error = %error,
            timeout = ?request_timeout,
            "Failed to create HTTP client; falling back to reqwest defaults"
        );
        reqwest::Client::new()
    })
}
