use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// What the mock upstream sends back.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Status and raw body.
    Fixed { status: StatusCode, body: Vec<u8> },

    /// 200 with an A-record answer built from the request.
    Answer { ip: [u8; 4] },

    /// Sleep, then answer like `Answer`.
    Slow { delay: Duration, ip: [u8; 4] },
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub accept: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

struct MockState {
    behavior: Mutex<MockBehavior>,
    requests: Mutex<Vec<RecordedRequest>>,
    hits: AtomicUsize,
}

/// DoH upstream on 127.0.0.1 serving `POST /dns-query`.
pub struct MockDohServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDohServer {
    pub async fn start(behavior: MockBehavior) -> Self {
        let state = Arc::new(MockState {
            behavior: Mutex::new(behavior),
            requests: Mutex::new(Vec::new()),
            hits: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/dns-query", post(handle_query))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}/dns-query", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn set_behavior(&self, behavior: MockBehavior) {
        *self.state.behavior.lock().unwrap() = behavior;
    }
}

impl Drop for MockDohServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn handle_query(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    state.requests.lock().unwrap().push(RecordedRequest {
        accept: header_value(header::ACCEPT),
        content_type: header_value(header::CONTENT_TYPE),
        body: body.to_vec(),
    });

    let behavior = state.behavior.lock().unwrap().clone();
    let (status, payload) = match behavior {
        MockBehavior::Fixed { status, body } => (status, body),
        MockBehavior::Answer { ip } => (StatusCode::OK, super::WireBuilder::a_response(&body, ip)),
        MockBehavior::Slow { delay, ip } => {
            tokio::time::sleep(delay).await;
            (StatusCode::OK, super::WireBuilder::a_response(&body, ip))
        }
    };

    (
        status,
        [(header::CONTENT_TYPE, "application/dns-message")],
        payload,
    )
}
