//! Test server harness.
//!
//! Two kinds of local servers: a fake fact-check search provider that the
//! real [`FactCheckSearchAdapter`](deepscope::FactCheckSearchAdapter) can be
//! pointed at, and the deepscope gateway itself.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use deepscope::gateway::{HandlerState, create_router_with_state};
use deepscope::verify::Verifier;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;
const FAKE_SEARCH_PATH: &str = "/v1alpha1/claims/search";

/// What the fake provider answers with.
#[derive(Debug, Clone)]
pub enum FakeReply {
    Json(serde_json::Value),
    Status(u16),
    Raw(String),
}

struct FakeState {
    reply: FakeReply,
    hits: AtomicUsize,
    queries: Mutex<Vec<HashMap<String, String>>>,
}

pub struct TestServer {
    pub addr: SocketAddr,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub struct FakeFactCheckServer {
    server: TestServer,
    state: Arc<FakeState>,
}

impl FakeFactCheckServer {
    pub fn search_url(&self) -> String {
        format!("{}{}", self.server.url(), FAKE_SEARCH_PATH)
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    /// Query strings received so far, in arrival order.
    pub fn queries(&self) -> Vec<HashMap<String, String>> {
        self.state.queries.lock().unwrap().clone()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

async fn serve(app: Router) -> Result<TestServer, ServerStartupError> {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let local_addr = listener.local_addr()?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    wait_for_server_ready(
        local_addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr: local_addr,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
    })
}

async fn fake_search_handler(
    State(state): State<Arc<FakeState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    state.queries.lock().unwrap().push(query);

    match &state.reply {
        FakeReply::Json(body) => (StatusCode::OK, Json(body.clone())).into_response(),
        FakeReply::Status(code) => {
            let status = StatusCode::from_u16(*code).unwrap();
            (status, Json(serde_json::json!({"error": {"code": code}}))).into_response()
        }
        FakeReply::Raw(text) => (StatusCode::OK, text.clone()).into_response(),
    }
}

/// Spawns a fake fact-check search provider answering every request with `reply`.
pub async fn spawn_fake_factcheck(
    reply: FakeReply,
) -> Result<FakeFactCheckServer, ServerStartupError> {
    let state = Arc::new(FakeState {
        reply,
        hits: AtomicUsize::new(0),
        queries: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route(FAKE_SEARCH_PATH, get(fake_search_handler))
        .with_state(Arc::clone(&state));

    let server = serve(app).await?;
    Ok(FakeFactCheckServer { server, state })
}

/// Spawns the deepscope gateway over `verifier`.
pub async fn spawn_gateway(verifier: Verifier) -> Result<TestServer, ServerStartupError> {
    serve(create_router_with_state(HandlerState::new(verifier))).await
}

/// A `claims:search` response with one claim reviewed by each `(publisher, rating)`.
pub fn search_response(ratings: &[(&str, &str)]) -> serde_json::Value {
    let reviews: Vec<serde_json::Value> = ratings
        .iter()
        .map(|(publisher, rating)| {
            let site = format!("{}.example", publisher.to_lowercase());
            serde_json::json!({
                "publisher": {"name": publisher, "site": site},
                "url": format!("https://{}/review", site),
                "title": "Fact check",
                "textualRating": rating,
                "languageCode": "en"
            })
        })
        .collect();

    serde_json::json!({
        "claims": [{
            "text": "claim under review",
            "claimant": "someone",
            "claimReview": reviews
        }]
    })
}
