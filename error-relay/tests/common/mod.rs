//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use error_relay::Result;
use error_relay::notification::NotificationSink;
use error_relay::tracking::{Details, ErrorEvent, ErrorLogger, OriginalError};
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// A request received by the capture server.
#[derive(Debug)]
pub struct Captured {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Captured {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

#[derive(Clone)]
struct CaptureState {
    tx: mpsc::UnboundedSender<Captured>,
    status: StatusCode,
}

/// Local HTTP server that records every request and answers with a fixed status.
pub struct CaptureServer {
    pub addr: SocketAddr,
    rx: mpsc::UnboundedReceiver<Captured>,
}

impl CaptureServer {
    pub async fn start(status: StatusCode) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let app = Router::new()
            .fallback(capture)
            .with_state(CaptureState { tx, status });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, rx }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Wait for the next captured request.
    pub async fn next(&mut self) -> Captured {
        tokio::time::timeout(Duration::from_secs(5), self.rx.recv())
            .await
            .expect("no request captured within 5s")
            .unwrap()
    }

    /// Drain everything captured so far.
    pub fn drain(&mut self) -> Vec<Captured> {
        let mut out = Vec::new();
        while let Ok(captured) = self.rx.try_recv() {
            out.push(captured);
        }
        out
    }
}

async fn capture(
    State(state): State<CaptureState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let _ = state.tx.send(Captured {
        method,
        path: uri.path().to_string(),
        headers,
        body,
    });
    state.status
}

/// Sink that forwards every delivered event to a channel.
pub struct ChannelSink(pub mpsc::UnboundedSender<ErrorEvent>);

#[async_trait]
impl NotificationSink for ChannelSink {
    fn sink_type(&self) -> &'static str {
        "channel"
    }

    fn is_enabled(&self) -> bool {
        true
    }

    async fn send(&self, event: &ErrorEvent) -> Result<()> {
        let _ = self.0.send(event.clone());
        Ok(())
    }
}

/// Logger that keeps every message in memory.
#[derive(Default)]
pub struct MemoryLogger {
    pub infos: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
}

impl ErrorLogger for MemoryLogger {
    fn info(&self, message: &str) {
        self.infos.lock().push(message.to_string());
    }

    fn error(&self, error_id: &str, _error: &OriginalError, _context: &str, _details: &Details) {
        self.errors.lock().push(error_id.to_string());
    }
}

pub fn memory_logger() -> Arc<MemoryLogger> {
    Arc::new(MemoryLogger::default())
}
