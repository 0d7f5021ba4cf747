//! Integration test harness for the NDX options monitor.
//!
//! Tests run against an in-process mock backend that serves `/api/options`
//! and `/api/health` on an ephemeral port. Failures can be switched on per
//! endpoint, and an echo route records what the front server forwards.

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{any, get};
use monitor_client::{ClientConfig, MonitorClient};
use ndx_options_monitor::api::create_router;
use ndx_options_monitor::config::Config;
use ndx_options_monitor::state::AppState;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Builds one raw trade row as the backend serves it.
#[must_use]
pub fn trade(option_type: &str, strike: &str, volume: &str) -> Value {
    json!({
        "Timestamp": "2025-01-10 09:31:02",
        "Symbol": format!("NDX250110{}", option_type.chars().next().unwrap_or('X')),
        "Option_Type": option_type,
        "Strike_Price": strike,
        "Close_Price": 12.5,
        "Volume": volume,
        "Accumulated_Volume": 1500,
        "High": 13.0,
        "Low": 11.75,
    })
}

/// A health body with every card populated.
#[must_use]
pub fn healthy() -> Value {
    json!({
        "status": "ok",
        "websocket_running": true,
        "data_count": 2,
        "current_strike": 25650.0,
        "live_ndx_price": 25648.6,
        "next_refresh_seconds": 65,
        "market_status": "open",
    })
}

/// Mutable behaviour of the mock backend.
#[derive(Debug, Default)]
pub struct MockState {
    /// Rows returned by `/api/options`.
    pub trades: Vec<Value>,
    /// Body returned by `/api/health`.
    pub health: Value,
    /// Respond to `/api/options` with 503.
    pub fail_options: bool,
    /// Respond to `/api/health` with 503.
    pub fail_health: bool,
    /// Number of `/api/options` requests served.
    pub options_hits: usize,
}

/// In-process stand-in for the data backend.
pub struct MockBackend {
    /// Listening address.
    pub addr: SocketAddr,
    state: Arc<Mutex<MockState>>,
    task: JoinHandle<()>,
}

impl MockBackend {
    /// Starts the mock on `127.0.0.1` with an ephemeral port.
    ///
    /// # Errors
    /// Returns error if the listener cannot be bound.
    pub async fn start(trades: Vec<Value>, health: Value) -> std::io::Result<Self> {
        let state = Arc::new(Mutex::new(MockState {
            trades,
            health,
            ..Default::default()
        }));

        let app = Router::new()
            .route("/api/options", get(options))
            .route("/api/health", get(health_check))
            .route("/api/echo", any(echo))
            .route("/api/echo/{*rest}", any(echo))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { addr, state, task })
    }

    /// Base URL of the mock API, e.g. `http://127.0.0.1:41234/api`.
    #[must_use]
    pub fn api_base(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Runs `f` with exclusive access to the mock state.
    pub fn update<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        f(&mut self.state.lock())
    }

    /// Number of `/api/options` requests served so far.
    #[must_use]
    pub fn options_hits(&self) -> usize {
        self.state.lock().options_hits
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn options(State(state): State<Arc<Mutex<MockState>>>) -> Response {
    let mut state = state.lock();
    state.options_hits += 1;
    if state.fail_options {
        return (StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable").into_response();
    }
    Json(json!({
        "data": state.trades,
        "count": state.trades.len(),
        "last_update": "2025-01-10T09:31:05",
    }))
    .into_response()
}

async fn health_check(State(state): State<Arc<Mutex<MockState>>>) -> Response {
    let state = state.lock();
    if state.fail_health {
        return (StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable").into_response();
    }
    Json(state.health.clone()).into_response()
}

/// Reflects the request as JSON so tests can see what was forwarded.
async fn echo(request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_else(|_| Bytes::new());
    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    (
        StatusCode::CREATED,
        [("x-backend", "mock")],
        Json(json!({
            "method": parts.method.as_str(),
            "path": parts.uri.path(),
            "query": parts.uri.query(),
            "host": header("host"),
            "content_type": header("content-type"),
            "custom": header("x-custom"),
            "body": String::from_utf8_lossy(&body),
        })),
    )
        .into_response()
}

/// Creates a client for `api_base`.
///
/// # Errors
/// Returns error if client creation fails.
pub fn create_test_client(api_base: &str) -> Result<MonitorClient, monitor_client::Error> {
    MonitorClient::new(ClientConfig {
        base_url: api_base.to_string(),
        timeout: Duration::from_secs(10),
    })
}

/// Front server running in-process without backend supervision.
pub struct FrontServer {
    /// Listening address.
    pub addr: SocketAddr,
    task: JoinHandle<()>,
}

impl FrontServer {
    /// Serves `static_dir` and proxies `/api` to `127.0.0.1:{backend_port}`.
    ///
    /// # Errors
    /// Returns error if the listener cannot be bound or the proxy client
    /// cannot be built.
    pub async fn start(backend_port: u16, static_dir: &Path) -> std::io::Result<Self> {
        let mut config = Config::default();
        config.server.static_dir = static_dir.to_path_buf();
        config.backend.host = "127.0.0.1".to_string();
        config.backend.port = backend_port;
        config.backend.spawn = false;

        let state = Arc::new(AppState::new(config).map_err(std::io::Error::other)?);
        let app = create_router(state);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { addr, task })
    }

    /// Absolute URL for `path` on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for FrontServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Returns a local port with nothing listening on it.
///
/// # Errors
/// Returns error if no port can be reserved.
pub async fn unused_port() -> std::io::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    Ok(listener.local_addr()?.port())
}

/// Creates a fresh directory holding a built-dashboard lookalike:
/// `index.html` and `assets/app.js`.
///
/// # Errors
/// Returns error if the files cannot be written.
pub fn static_site(prefix: &str) -> std::io::Result<PathBuf> {
    let dir = std::env::temp_dir().join(unique_name(prefix));
    std::fs::create_dir_all(dir.join("assets"))?;
    std::fs::write(
        dir.join("index.html"),
        "<!doctype html><div id=\"root\"></div>",
    )?;
    std::fs::write(dir.join("assets").join("app.js"), "console.log('dashboard');")?;
    Ok(dir)
}

/// Generates a unique name to avoid conflicts between tests.
#[must_use]
pub fn unique_name(prefix: &str) -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);

    format!("{}_{}_{}_{}", prefix, std::process::id(), ts, counter)
}
