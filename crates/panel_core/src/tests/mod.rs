
use std::collections::{HashMap, VecDeque};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::put,
    Router,
};
use tokio::{
    net::TcpListener,
    sync::{Mutex, Notify},
};

use crate::transport::{BuzzerTransport, TransportError};
use crate::view::PanelControl;
use crate::worker::{RegistrarError, WorkerRegistrar, WorkerRegistration};
use crate::Navigator;
use shared::domain::{CsrfToken, DoorId};
use shared::protocol;

pub(crate) fn door(id: &str) -> DoorId {
    DoorId::new(id)
}

pub(crate) fn csrf() -> CsrfToken {
    CsrfToken::new("test-csrf-token").expect("token")
}

pub(crate) fn layout() -> Vec<PanelControl> {
    vec![
        PanelControl::bound("buzz-inner-glass", "innerGlass"),
        PanelControl::bound("buzz-outer", "outer"),
        PanelControl::unbound("logout"),
    ]
}

/// Lets paused-clock tests drain every ready task before asserting.
pub(crate) async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// Scripted transport: hands out canned replies in order, optionally holding
/// the next call open until the test releases it.
pub(crate) struct StubTransport {
    replies: Mutex<VecDeque<Result<String, TransportError>>>,
    pub(crate) calls: Mutex<Vec<(String, String)>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl StubTransport {
    pub(crate) fn replying(
        replies: impl IntoIterator<Item = Result<String, TransportError>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
            gate: Mutex::new(None),
        })
    }

    pub(crate) async fn hold_next_call(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().await = Some(Arc::clone(&gate));
        gate
    }
}

#[async_trait]
impl BuzzerTransport for StubTransport {
    async fn buzz(&self, door: &DoorId, csrf: &CsrfToken) -> Result<String, TransportError> {
        self.calls
            .lock()
            .await
            .push((door.as_str().to_string(), csrf.as_str().to_string()));

        let gate = self.gate.lock().await.take();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.replies
            .lock()
            .await
            .pop_front()
            .expect("unexpected buzz call")
    }
}

pub(crate) struct RecordingNavigator {
    pub(crate) redirects: Mutex<Vec<String>>,
    pub(crate) notify: Notify,
}

impl RecordingNavigator {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            redirects: Mutex::new(Vec::new()),
            notify: Notify::new(),
        })
    }
}

#[async_trait]
impl Navigator for RecordingNavigator {
    async fn redirect(&self, location: &str) {
        self.redirects.lock().await.push(location.to_string());
        self.notify.notify_one();
    }
}

pub(crate) struct RecordingRegistrar {
    supported: bool,
    fail: bool,
    pub(crate) paths: Mutex<Vec<String>>,
    pub(crate) notify: Notify,
}

impl RecordingRegistrar {
    pub(crate) fn new(supported: bool, fail: bool) -> Arc<Self> {
        Arc::new(Self {
            supported,
            fail,
            paths: Mutex::new(Vec::new()),
            notify: Notify::new(),
        })
    }
}

#[async_trait]
impl WorkerRegistrar for RecordingRegistrar {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn register(&self, script_path: &str) -> Result<WorkerRegistration, RegistrarError> {
        self.paths.lock().await.push(script_path.to_string());
        self.notify.notify_one();
        if self.fail {
            return Err(RegistrarError::Failed {
                reason: "quota exceeded".to_string(),
            });
        }
        Ok(WorkerRegistration {
            scope: "/".to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CapturedBuzz {
    pub(crate) door: Option<String>,
    pub(crate) csrf: Option<String>,
    pub(crate) body: String,
}

#[derive(Clone)]
pub(crate) struct BuzzerServerState {
    pub(crate) hits: Arc<AtomicUsize>,
    pub(crate) captured: Arc<std::sync::Mutex<Vec<CapturedBuzz>>>,
    reply_status: StatusCode,
    reply_body: &'static str,
}

async fn buzzer_endpoint(
    State(state): State<BuzzerServerState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    state.hits.fetch_add(1, Ordering::SeqCst);
    state.captured.lock().expect("capture lock").push(CapturedBuzz {
        door: params.get(protocol::DOOR_QUERY_PARAM).cloned(),
        csrf: headers
            .get(protocol::CSRF_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(String::from),
        body,
    });
    (state.reply_status, state.reply_body.to_string())
}

/// Spins up a real buzzer endpoint that records every request and answers
/// with a fixed status/body. Only `PUT /buzzer` is routed, so any other
/// method or path fails the request outright.
pub(crate) async fn spawn_buzzer_server(
    reply_status: StatusCode,
    reply_body: &'static str,
) -> (String, BuzzerServerState) {
    let state = BuzzerServerState {
        hits: Arc::new(AtomicUsize::new(0)),
        captured: Arc::new(std::sync::Mutex::new(Vec::new())),
        reply_status,
        reply_body,
    };

    let app = Router::new()
        .route(protocol::BUZZER_PATH, put(buzzer_endpoint))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    (format!("http://{addr}"), state)
}
