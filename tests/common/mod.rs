//! Common test utilities
//!
//! Provides shared helpers for:
//! - An in-process mock backend that records every call it receives
//! - Building outbox managers and sync engines over an in-memory store

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::{Json, Router};
use serde_json::Value;

use fieldsync::{
    HttpMethod, MemoryStore, OutboxManager, OutboxRequest, Reachability, SyncConfig, SyncEngine,
};

/// One request as seen by the mock backend.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
struct MockBackendState {
    calls: Mutex<Vec<RecordedCall>>,
    statuses: Mutex<HashMap<String, u16>>,
    bodies: Mutex<HashMap<String, Value>>,
    delay: Mutex<Option<Duration>>,
}

/// In-process HTTP backend. Answers 200 with a null body unless a status or
/// body override is configured for the path.
pub struct MockBackend {
    pub addr: SocketAddr,
    state: Arc<MockBackendState>,
}

impl MockBackend {
    pub async fn start() -> Self {
        // Surface engine logs when RUST_LOG is set
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();

        let state = Arc::new(MockBackendState::default());
        let router = Router::new().fallback(record_call).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("Failed to read local addr");

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Mock backend died");
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> url::Url {
        url::Url::parse(&format!("http://{}", self.addr)).expect("Failed to parse base url")
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Answer `status` for requests to `path`.
    pub fn respond_with_status(&self, path: &str, status: u16) {
        self.state
            .statuses
            .lock()
            .unwrap()
            .insert(path.to_string(), status);
    }

    /// Answer `body` for requests to `path`.
    pub fn respond_with_body(&self, path: &str, body: Value) {
        self.state
            .bodies
            .lock()
            .unwrap()
            .insert(path.to_string(), body);
    }

    /// Hold every request for `delay` before answering.
    pub fn set_delay(&self, delay: Duration) {
        *self.state.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn call_paths(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.path).collect()
    }
}

async fn record_call(
    State(state): State<Arc<MockBackendState>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let delay = *state.delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let path = uri.path().to_string();
    let parsed = if body.is_empty() {
        None
    } else {
        serde_json::from_slice(&body).ok()
    };
    state.calls.lock().unwrap().push(RecordedCall {
        method: method.to_string(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        body: parsed,
    });

    let status = state.statuses.lock().unwrap().get(&path).copied().unwrap_or(200);
    let body = state
        .bodies
        .lock()
        .unwrap()
        .get(&path)
        .cloned()
        .unwrap_or(Value::Null);
    (
        StatusCode::from_u16(status).expect("Invalid mock status"),
        Json(body),
    )
}

pub fn memory_outbox() -> Arc<OutboxManager> {
    Arc::new(OutboxManager::new(Arc::new(MemoryStore::new())))
}

/// Engine wired to the mock backend with no inter-entry delay.
pub fn test_engine(
    outbox: Arc<OutboxManager>,
    backend: &MockBackend,
    reachability: Reachability,
) -> Arc<SyncEngine> {
    let config = SyncConfig {
        base_url: Some(backend.base_url()),
        request_timeout: Duration::from_secs(5),
        inter_entry_delay: Duration::from_millis(0),
    };
    Arc::new(SyncEngine::new(outbox, reachability, config).expect("Failed to build engine"))
}

pub fn post_request(path: &str, label: &str, body: Value) -> OutboxRequest {
    OutboxRequest {
        url: path.to_string(),
        method: HttpMethod::Post,
        body,
        label: label.to_string(),
        kind: None,
    }
}

pub fn put_request(path: &str, label: &str, body: Value) -> OutboxRequest {
    OutboxRequest {
        url: path.to_string(),
        method: HttpMethod::Put,
        body,
        label: label.to_string(),
        kind: None,
    }
}
