//! Launches the real binary: the uncaught-panic endpoint must take the
//! process down, while recovered endpoints keep it alive.

use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use error_relay::utils::http_client::build_client;

struct ChildGuard(Child);

impl Drop for ChildGuard {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

fn spawn_server(port: u16) -> ChildGuard {
    let child = Command::new(env!("CARGO_BIN_EXE_error-relay"))
        .env("PORT", port.to_string())
        .env("BIND_ADDRESS", "127.0.0.1")
        .env("BOT_ENABLED", "false")
        .env("DISCORD_WEBHOOK_URL", "")
        .env("ELK_URL", "")
        .env("RUST_LOG", "error")
        .env_remove("LOG_DIR")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    ChildGuard(child)
}

async fn wait_until_healthy(client: &reqwest::Client, base: &str) {
    let deadline = Instant::now() + Duration::from_secs(20);
    while Instant::now() < deadline {
        if let Ok(response) = client.get(format!("{base}/health")).send().await
            && response.status().is_success()
        {
            return;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    panic!("server did not become healthy");
}

#[tokio::test]
async fn test_uncaught_panic_terminates_process() {
    let port = free_port();
    let mut server = spawn_server(port);
    let base = format!("http://127.0.0.1:{port}");
    let client = build_client(Duration::from_secs(5));

    wait_until_healthy(&client, &base).await;

    let recovered = client
        .get(format!("{base}/api/error/panic"))
        .send()
        .await
        .unwrap();
    assert_eq!(recovered.status().as_u16(), 500);
    assert!(server.0.try_wait().unwrap().is_none());

    let crashed = client
        .get(format!("{base}/api/error/uncaught-panic"))
        .send()
        .await;
    assert!(crashed.is_err());

    let deadline = Instant::now() + Duration::from_secs(10);
    let status = loop {
        if let Some(status) = server.0.try_wait().unwrap() {
            break status;
        }
        assert!(Instant::now() < deadline, "process still running");
        tokio::time::sleep(Duration::from_millis(50)).await;
    };
    assert!(!status.success());
}
