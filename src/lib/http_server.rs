//! HTTP server exposing scrape results using Axum.
//!
//! One route does the work: `GET /probe?target=https://fw.example.com` runs
//! the full probe battery against the target and answers with the Prometheus
//! text exposition. Partial snapshots are always published — a failed probe
//! only flips `fortigate_probe_success` to 0.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::{future::Future, net::SocketAddr, sync::Arc, time::Instant};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::AuthKeys;
use crate::error::ScrapeError;
use crate::metrics::MetricDesc;
use crate::probe::probe_target;

static PROBE_SUCCESS: MetricDesc = MetricDesc::gauge(
    "fortigate_probe_success",
    "Whether every probe against the target succeeded.",
    &[],
);
static PROBE_DURATION: MetricDesc = MetricDesc::gauge(
    "fortigate_probe_duration_seconds",
    "Time the whole scrape took.",
    &[],
);

/// Shared state for all HTTP handlers.
#[derive(Clone)]
struct ServerState {
    auth: Arc<AuthKeys>,
    http: reqwest::Client,
    scrape_timeout: std::time::Duration,
}

/// HTTP server that exposes per-target scrapes.
pub struct ExporterServer {
    bind_address: SocketAddr,
    state: ServerState,
}

impl ExporterServer {
    pub fn new(
        bind_address: SocketAddr,
        auth: Arc<AuthKeys>,
        http: reqwest::Client,
        scrape_timeout: std::time::Duration,
    ) -> Self {
        Self {
            bind_address,
            state: ServerState {
                auth,
                http,
                scrape_timeout,
            },
        }
    }

    /// Run the exporter server until the shutdown signal completes.
    pub async fn run(
        self,
        shutdown_signal: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!("Starting exporter on http://{}", self.bind_address);

        let app = Router::new()
            .route("/", get(handle_root))
            .route("/probe", get(handle_probe))
            .with_state(self.state);

        let listener = TcpListener::bind(self.bind_address).await?;
        info!(
            "Scrape endpoint available at http://{}/probe?target=...",
            self.bind_address
        );

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_signal.await;
                info!("Exporter received shutdown signal, stopping...");
            })
            .await;

        info!("Exporter stopped");
        result.map_err(|e| e.into())
    }
}

async fn handle_root() -> Html<&'static str> {
    Html(
        "<html><head><title>FortiGate Exporter</title></head><body>\
         <h1>FortiGate Exporter</h1>\
         <p>Scrape a device: <a href=\"/probe?target=https://fw.example.com\">\
         /probe?target=https://fw.example.com</a></p>\
         </body></html>",
    )
}

#[derive(Deserialize)]
struct ProbeParams {
    target: String,
}

async fn handle_probe(
    State(state): State<ServerState>,
    Query(params): Query<ProbeParams>,
) -> Response {
    let started = Instant::now();

    let outcome = tokio::time::timeout(
        state.scrape_timeout,
        probe_target(&params.target, &state.auth, &state.http),
    )
    .await;

    let mut snapshot = match outcome {
        Err(_elapsed) => {
            warn!(target = %params.target, "scrape timed out");
            return (StatusCode::GATEWAY_TIMEOUT, "scrape timed out\n").into_response();
        }
        Ok(Err(err)) => {
            let status = match err {
                ScrapeError::UnknownTarget(_) => StatusCode::NOT_FOUND,
                ScrapeError::InvalidTarget(_) | ScrapeError::UnsupportedScheme(_) => {
                    StatusCode::BAD_REQUEST
                }
            };
            return (status, format!("{err}\n")).into_response();
        }
        Ok(Ok(snapshot)) => snapshot,
    };

    let success = if snapshot.success { 1.0 } else { 0.0 };
    snapshot.push(PROBE_SUCCESS.observe::<&str>(&[], success));
    snapshot.push(PROBE_DURATION.observe::<&str>(&[], started.elapsed().as_secs_f64()));

    match snapshot.encode_text() {
        Ok(body) => (
            StatusCode::OK,
            [("Content-Type", "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => {
            warn!(error = %err, "failed to encode snapshot");
            (StatusCode::INTERNAL_SERVER_ERROR, "encoding failed\n").into_response()
        }
    }
}
