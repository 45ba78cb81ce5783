//! ## FortiGate Exporter
//!
//! Prometheus exporter for FortiGate firewall appliances. On every
//! `/probe?target=...` request it polls the device's REST monitoring API,
//! translates each endpoint's JSON shape into flat labeled observations,
//! and answers with one fresh text exposition. Probes tolerate partial
//! failure: every routine that succeeds contributes its observations, and
//! the aggregate `fortigate_probe_success` flag is the AND of all of them.
//!
//! The central components are the [`client::FortiClient`] transport
//! abstraction, the fixed probe battery under [`probe`], and the
//! [`http_server::ExporterServer`] serving layer. Per-target API tokens are
//! loaded once at startup into [`config::AuthKeys`] and never mutated.

pub mod client;
pub mod config;
pub mod error;
pub mod http_server;
pub mod metrics;
pub mod probe;
pub mod version;

pub use client::FortiClient;
pub use config::{AuthKeys, ExporterConfig};
pub use error::{ProbeError, ScrapeError};
pub use http_server::ExporterServer;
pub use metrics::{MetricDesc, MetricKind, Observation, ProbeReport, Snapshot};
pub use probe::{normalize_target, probe_target};
pub use version::SystemVersion;
