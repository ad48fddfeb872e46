mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use common::CaptureServer;
use error_relay::bot::{BotState, ERROR_ENDPOINTS, HitOutcome, LoadGeneratorBot};

#[tokio::test]
async fn test_start_then_stop_hits_exactly_once() {
    let mut server = CaptureServer::start(StatusCode::INTERNAL_SERVER_ERROR).await;
    let bot = Arc::new(LoadGeneratorBot::new(server.url(""), Duration::from_millis(500)).unwrap());

    let handle = bot.start().unwrap();
    assert!(bot.stop());
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();

    let first = server.next().await;
    assert!(ERROR_ENDPOINTS.contains(&first.path.as_str()));

    tokio::time::sleep(Duration::from_millis(800)).await;
    assert!(server.drain().is_empty());
    assert_eq!(bot.state(), BotState::Stopped);
}

#[tokio::test]
async fn test_bot_keeps_ticking_until_stopped() {
    let mut server = CaptureServer::start(StatusCode::INTERNAL_SERVER_ERROR).await;
    let bot = Arc::new(LoadGeneratorBot::new(server.url(""), Duration::from_millis(50)).unwrap());

    let handle = bot.start().unwrap();
    for _ in 0..3 {
        let captured = server.next().await;
        assert_eq!(captured.method, "GET");
        assert!(ERROR_ENDPOINTS.contains(&captured.path.as_str()));
    }

    bot.stop();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_hit_classifies_responses() {
    let failing = CaptureServer::start(StatusCode::INTERNAL_SERVER_ERROR).await;
    let bot = LoadGeneratorBot::new(failing.url(""), Duration::from_secs(60)).unwrap();
    assert_eq!(
        bot.hit("/api/error/database").await,
        HitOutcome::TriggeredError(500)
    );

    let healthy = CaptureServer::start(StatusCode::OK).await;
    let bot = LoadGeneratorBot::new(healthy.url(""), Duration::from_secs(60)).unwrap();
    assert_eq!(
        bot.hit("/api/error/database").await,
        HitOutcome::UnexpectedSuccess(200)
    );
}

#[tokio::test]
async fn test_transport_failures_do_not_stop_the_loop() {
    let bot = Arc::new(LoadGeneratorBot::new("http://127.0.0.1:1", Duration::from_millis(20)).unwrap());

    let handle = bot.start().unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!handle.is_finished());
    assert_eq!(bot.state(), BotState::Running);

    bot.stop();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
}
