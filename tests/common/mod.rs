//! Shared utilities for integration testing: a mock game API and mock finalizers.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::routing::any;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Notify;

use farm_checkout::blockchain::{BlockchainError, BlockchainResult};
use farm_checkout::checkout::{Finalizer, SessionCall, SessionId};

pub const FARM_ID: u64 = 42;
pub const TOKEN: &str = "test-token";

/// A request as the mock API saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Value,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    body: Value,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Game API stand-in answering every path with a fixed status and body.
pub struct MockApi {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockApi {
    pub async fn start(status: u16, body: Value) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            status: StatusCode::from_u16(status).unwrap(),
            body,
            requests: requests.clone(),
        };
        let app = Router::new()
            .route("/{*path}", any(record))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, requests }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn record(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    state.requests.lock().unwrap().push(RecordedRequest {
        method,
        path: uri.path().to_string(),
        headers,
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });
    (state.status, Json(state.body.clone()))
}

/// Session envelope fields every descriptor carries, merged with `payload`.
pub fn descriptor(payload: Value) -> Value {
    let mut tx = json!({
        "signature": "0xdeadbeef",
        "sessionId": format!("0x{}", "11".repeat(32)),
        "nextSessionId": format!("0x{}", "22".repeat(32)),
        "deadline": 1_700_000_000u64,
        "farmId": FARM_ID,
    });
    if let (Some(tx), Value::Object(payload)) = (tx.as_object_mut(), payload) {
        tx.extend(payload);
    }
    tx
}

/// Finalizer that records calls and answers with a fixed result.
#[derive(Clone)]
pub struct MockFinalizer {
    calls: Arc<AtomicUsize>,
    received: Arc<Mutex<Vec<SessionCall>>>,
    session_id: Option<String>,
}

impl MockFinalizer {
    pub fn returning(session_id: &str) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            received: Arc::new(Mutex::new(Vec::new())),
            session_id: Some(session_id.to_string()),
        }
    }

    /// Behaves like a wallet whose user declines to sign.
    pub fn rejecting() -> Self {
        Self {
            session_id: None,
            ..Self::returning("")
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn received(&self) -> Vec<SessionCall> {
        self.received.lock().unwrap().clone()
    }
}

impl Finalizer for MockFinalizer {
    async fn finalize(&self, call: SessionCall) -> BlockchainResult<SessionId> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.received.lock().unwrap().push(call);
        match &self.session_id {
            Some(id) => Ok(SessionId::new(id.clone())),
            None => Err(BlockchainError::Wallet("user rejected the request".into())),
        }
    }
}

/// Finalizer that blocks until released, for observing in-flight attempts.
#[derive(Clone, Default)]
pub struct GatedFinalizer {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl Finalizer for GatedFinalizer {
    async fn finalize(&self, _call: SessionCall) -> BlockchainResult<SessionId> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(SessionId::new("0xgated"))
    }
}
