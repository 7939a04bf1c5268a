//! Reference implementation of the calculator service.
//!
//! Serves the same contract the verifier checks, so the verifier can run
//! without an external deployment:
//! - `/calc/{op}/{a}/{b}` - add, multiply, divide
//! - `/calc/sqrt/{a}` - square root
//! - `/health` - liveness and request counter
//!
//! [`MockCalculatorServer`] runs the router on a background thread with its
//! own tokio runtime. The `calc-stub` binary serves the same router.

use std::net::{SocketAddr, TcpListener};
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::format::{format_decimal, parse_operand};
use crate::operation::Operation;
use crate::verify::DIVISION_BY_ZERO;

pub const NEGATIVE_SQRT: &str = "Square root of negative number";
pub const NOT_A_NUMBER: &str = "Operator cannot be converted to number";

/// Shared state for HTTP handlers.
#[derive(Debug)]
pub struct ServiceState {
    /// Delay applied before answering any `/calc` request.
    pub latency: Duration,
    pub started_at: Instant,
    requests: AtomicU64,
}

impl ServiceState {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            started_at: Instant::now(),
            requests: AtomicU64::new(0),
        }
    }

    /// Number of `/calc` requests received so far.
    pub fn requests_served(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }
}

/// Create the calculator router.
pub fn create_router(state: Arc<ServiceState>) -> Router {
    Router::new()
        .route("/calc/{op}/{a}", get(unary_handler))
        .route("/calc/{op}/{a}/{b}", get(binary_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

async fn unary_handler(
    State(state): State<Arc<ServiceState>>,
    Path((op, a)): Path<(String, String)>,
) -> Response {
    calculate(&state, &op, &[a]).await
}

async fn binary_handler(
    State(state): State<Arc<ServiceState>>,
    Path((op, a, b)): Path<(String, String, String)>,
) -> Response {
    calculate(&state, &op, &[a, b]).await
}

async fn calculate(state: &ServiceState, op: &str, raw: &[String]) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    if !state.latency.is_zero() {
        tokio::time::sleep(state.latency).await;
    }

    let operation = match Operation::from_str(op) {
        Ok(operation) if operation.arity() == raw.len() => operation,
        _ => return (StatusCode::NOT_FOUND, "Not Found".to_string()).into_response(),
    };

    let mut operands = Vec::with_capacity(raw.len());
    for value in raw {
        match parse_operand(value) {
            Some(v) => operands.push(v),
            None => {
                debug!(operation = %operation, operand = %value, "rejecting non-numeric operand");
                return (StatusCode::BAD_REQUEST, NOT_A_NUMBER.to_string()).into_response();
            }
        }
    }

    let (status, body) = match evaluate(operation, &operands) {
        Ok(result) => (StatusCode::OK, format_decimal(result)),
        Err(message) => (StatusCode::NOT_ACCEPTABLE, message.to_string()),
    };
    debug!(operation = %operation, status = status.as_u16(), body = %body, "calculated");
    (status, body).into_response()
}

fn evaluate(operation: Operation, operands: &[f64]) -> Result<f64, &'static str> {
    match (operation, operands) {
        (Operation::Divide, [_, b]) if *b == 0.0 => Err(DIVISION_BY_ZERO),
        (Operation::Sqrt, [a]) if *a < 0.0 => Err(NEGATIVE_SQRT),
        _ => operation.evaluate(operands).ok_or(NOT_A_NUMBER),
    }
}

async fn health_handler(State(state): State<Arc<ServiceState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": state.started_at.elapsed().as_secs(),
        "requests_served": state.requests_served(),
    }))
}

/// Handle to a running in-process calculator service.
///
/// Dropping the handle shuts the server down.
#[derive(Debug)]
pub struct MockCalculatorServer {
    addr: SocketAddr,
    state: Arc<ServiceState>,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<std::io::Result<()>>>,
}

impl MockCalculatorServer {
    pub fn builder() -> MockCalculatorServerBuilder {
        MockCalculatorServerBuilder::default()
    }

    /// Start with defaults: ephemeral localhost port, no latency.
    pub fn start() -> std::io::Result<Self> {
        Self::builder().start()
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL to hand to the verifier, e.g. `http://127.0.0.1:41234`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests_served(&self) -> u64 {
        self.state.requests_served()
    }

    /// Stop the server and wait for the background thread to exit.
    pub fn shutdown(mut self) -> std::io::Result<()> {
        self.signal_shutdown();
        match self.thread.take() {
            Some(handle) => handle
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("calculator server thread panicked"))),
            None => Ok(()),
        }
    }

    fn signal_shutdown(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockCalculatorServer {
    fn drop(&mut self) {
        // In-flight delayed requests may still be sleeping; don't block on them.
        self.signal_shutdown();
    }
}

#[derive(Debug, Clone)]
pub struct MockCalculatorServerBuilder {
    addr: SocketAddr,
    latency: Duration,
}

impl Default for MockCalculatorServerBuilder {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            latency: Duration::ZERO,
        }
    }
}

impl MockCalculatorServerBuilder {
    /// Bind address. Port 0 picks a free port.
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    /// Delay every `/calc` response, for exercising client timeouts.
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Bind the socket and start serving on a background thread.
    ///
    /// The socket is bound before this returns, so requests made right after
    /// are queued rather than refused.
    pub fn start(self) -> std::io::Result<MockCalculatorServer> {
        let listener = TcpListener::bind(self.addr)?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;

        let state = Arc::new(ServiceState::new(self.latency));
        let router = create_router(Arc::clone(&state));
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let thread = std::thread::Builder::new()
            .name(format!("calc-mock-{}", addr.port()))
            .spawn(move || {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()?;
                let result = runtime.block_on(async move {
                    let listener = tokio::net::TcpListener::from_std(listener)?;
                    axum::serve(listener, router)
                        .with_graceful_shutdown(async {
                            let _ = shutdown_rx.await;
                        })
                        .await
                });
                if let Err(ref e) = result {
                    warn!(error = %e, "calculator server exited with error");
                }
                result
            })?;

        debug!(%addr, latency_ms = self.latency.as_millis() as u64, "calculator server started");

        Ok(MockCalculatorServer {
            addr,
            state,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        })
    }
}
