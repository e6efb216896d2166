//! Shared test harness: mock transport, stub conversation backend, and a
//! recording event handler.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::routing::post;
use axum::{Json, Router};
use tokio::sync::mpsc;

use guidecall_client_core::{
    AudioTransport, ChannelOptions, ClientError, ClientEvent, ClientResult, ConnectionState,
    ConnectionStateInfo, RecordPermission, SessionEventHandler, TransportEvent,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("guidecall_client_core=debug")
        .with_test_writer()
        .try_init();
}

/// Poll `condition` until it holds or a 5s deadline passes.
pub async fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !condition() {
        if Instant::now() > deadline {
            panic!("timed out waiting for {}", what);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

// ===== MOCK TRANSPORT =====

/// Transport double: records every operation, returns a configurable join
/// result, and exposes the event sender so tests can inject engine events.
pub struct MockTransport {
    ops: Mutex<Vec<String>>,
    join_result: AtomicI32,
    events: Mutex<Option<mpsc::UnboundedSender<TransportEvent>>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            ops: Mutex::new(Vec::new()),
            join_result: AtomicI32::new(0),
            events: Mutex::new(None),
        })
    }

    pub fn set_join_result(&self, code: i32) {
        self.join_result.store(code, Ordering::SeqCst);
    }

    pub fn ops(&self) -> Vec<String> {
        self.ops.lock().unwrap().clone()
    }

    /// Inject a transport event as the engine would.
    pub fn emit(&self, event: TransportEvent) {
        self.events
            .lock()
            .unwrap()
            .as_ref()
            .expect("transport not initialized")
            .send(event)
            .expect("event ingestion task is gone");
    }
}

#[async_trait]
impl AudioTransport for MockTransport {
    async fn initialize(
        &self,
        app_id: &str,
        events: mpsc::UnboundedSender<TransportEvent>,
    ) -> ClientResult<()> {
        self.ops.lock().unwrap().push(format!("initialize:{}", app_id));
        *self.events.lock().unwrap() = Some(events);
        Ok(())
    }

    async fn join(
        &self,
        _token: &str,
        channel: &str,
        user_id: u32,
        _options: &ChannelOptions,
    ) -> i32 {
        self.ops.lock().unwrap().push(format!("join:{}:{}", channel, user_id));
        self.join_result.load(Ordering::SeqCst)
    }

    async fn leave(&self) {
        self.ops.lock().unwrap().push("leave".to_string());
    }

    async fn mute_local(&self, muted: bool) {
        self.ops.lock().unwrap().push(format!("mute:{}", muted));
    }

    async fn destroy(&self) {
        self.ops.lock().unwrap().push("destroy".to_string());
    }
}

/// Permission source that always denies.
pub struct DeniedPermission;

#[async_trait]
impl RecordPermission for DeniedPermission {
    async fn microphone_allowed(&self) -> bool {
        false
    }
}

// ===== RECORDING EVENT HANDLER =====

/// Observer that records every event in delivery order.
pub struct RecordingHandler {
    events: Mutex<Vec<ClientEvent>>,
}

impl RecordingHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { events: Mutex::new(Vec::new()) })
    }

    pub fn events(&self) -> Vec<ClientEvent> {
        self.events.lock().unwrap().clone()
    }

    /// New states from `ConnectionStateChanged` events, in delivery order.
    pub fn states(&self) -> Vec<ConnectionState> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ClientEvent::ConnectionStateChanged { info } => Some(info.new_state),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<ClientError> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ClientEvent::SessionError { error, .. } => Some(error),
                _ => None,
            })
            .collect()
    }

    pub fn microphone_states(&self) -> Vec<bool> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ClientEvent::MicrophoneStateChanged { info } => Some(info.muted),
                _ => None,
            })
            .collect()
    }

    pub fn remote_mute_changes(&self) -> Vec<(u32, bool)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ClientEvent::RemoteMuteChanged { info } => Some((info.participant, info.muted)),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl SessionEventHandler for RecordingHandler {
    async fn on_connection_state_changed(&self, _info: ConnectionStateInfo) {}

    async fn on_session_error(&self, _error: ClientError) {}

    async fn on_event(&self, event: ClientEvent) {
        self.events.lock().unwrap().push(event);
    }
}

// ===== STUB CONVERSATION BACKEND =====

/// Canned response configuration, adjustable mid-test.
pub struct Behavior {
    config_status: Mutex<u16>,
    config_body: Mutex<serde_json::Value>,
    start_status: Mutex<u16>,
    end_status: Mutex<u16>,
}

#[derive(Clone)]
struct AppState {
    behavior: Arc<Behavior>,
    hits: Arc<Mutex<Vec<(String, serde_json::Value)>>>,
}

/// In-process conversation service stub bound to an ephemeral port.
pub struct StubBackend {
    pub addr: SocketAddr,
    behavior: Arc<Behavior>,
    hits: Arc<Mutex<Vec<(String, serde_json::Value)>>>,
}

impl StubBackend {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Request paths in arrival order.
    pub fn paths(&self) -> Vec<String> {
        self.hits.lock().unwrap().iter().map(|(path, _)| path.clone()).collect()
    }

    /// Full (path, body) pairs in arrival order.
    pub fn hits(&self) -> Vec<(String, serde_json::Value)> {
        self.hits.lock().unwrap().clone()
    }

    pub fn set_config_status(&self, status: u16) {
        *self.behavior.config_status.lock().unwrap() = status;
    }

    pub fn set_config_body(&self, body: serde_json::Value) {
        *self.behavior.config_body.lock().unwrap() = body;
    }

    pub fn set_start_status(&self, status: u16) {
        *self.behavior.start_status.lock().unwrap() = status;
    }

    pub fn set_end_status(&self, status: u16) {
        *self.behavior.end_status.lock().unwrap() = status;
    }
}

/// A credentials body matching what the production negotiation returns.
pub fn sample_credentials_body() -> serde_json::Value {
    serde_json::json!({
        "userId": 4021,
        "conversationToken": "tok-9f8e7d",
        "communicationChannel": "tour-42-room-7",
        "geolocation": { "latitude": 37.7749, "longitude": -122.4194 },
        "locationInfo": "Golden Gate Park, San Francisco",
        "sdrtnId": "sdrtn-app-01",
        "tourId": 42,
        "systemTourId": "sys-0042",
        "tourInfo": "Golden Gate highlights"
    })
}

async fn config_handler(
    State(state): State<AppState>,
    uri: Uri,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    state.hits.lock().unwrap().push((uri.path().to_string(), body));
    let status = StatusCode::from_u16(*state.behavior.config_status.lock().unwrap()).unwrap();
    let response = state.behavior.config_body.lock().unwrap().clone();
    (status, Json(response))
}

async fn start_handler(
    State(state): State<AppState>,
    uri: Uri,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    state.hits.lock().unwrap().push((uri.path().to_string(), body));
    let status = StatusCode::from_u16(*state.behavior.start_status.lock().unwrap()).unwrap();
    (status, Json(serde_json::json!({ "status": "ok" })))
}

async fn end_handler(
    State(state): State<AppState>,
    uri: Uri,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    state.hits.lock().unwrap().push((uri.path().to_string(), body));
    let status = StatusCode::from_u16(*state.behavior.end_status.lock().unwrap()).unwrap();
    (status, Json(serde_json::json!({ "status": "ok" })))
}

/// Spawn the stub backend with all endpoints succeeding.
pub async fn spawn_backend() -> StubBackend {
    let behavior = Arc::new(Behavior {
        config_status: Mutex::new(200),
        config_body: Mutex::new(sample_credentials_body()),
        start_status: Mutex::new(200),
        end_status: Mutex::new(200),
    });
    let hits = Arc::new(Mutex::new(Vec::new()));

    let app = Router::new()
        .route("/conversation/tour/config", post(config_handler))
        .route("/conversation/config", post(config_handler))
        .route("/conversation/start", post(start_handler))
        .route("/conversation/end", post(end_handler))
        .with_state(AppState { behavior: Arc::clone(&behavior), hits: Arc::clone(&hits) });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    StubBackend { addr, behavior, hits }
}
