//! Probe orchestration.
//!
//! A scrape resolves a target, builds one [`FortiClient`], runs the fixed
//! battery of probe routines concurrently, and unions their observations
//! into a [`Snapshot`]. Probes are independent and order-free; the union is
//! collected back in registry order so the rendered output stays
//! deterministic run to run.
//!
//! Each probe routine is a stateless async function of the client. A probe
//! that fails — transport, bad status, decode mismatch, semantic error —
//! contributes zero observations and flips the aggregate success flag, but
//! never disturbs its siblings.

use reqwest::Url;
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::warn;

use crate::client::FortiClient;
use crate::config::AuthKeys;
use crate::error::{ProbeError, ScrapeError};
use crate::metrics::{Observation, ProbeReport, Snapshot};

mod certificates;
mod firewall_policies;
mod fortimanager_status;
mod ha_statistics;
mod interfaces;
mod ipsec_tunnels;
mod license;
mod link_monitor;
mod log_disk_usage;
mod sensor_info;
mod ssl_vpn_sessions;
mod system_resources;
mod system_status;
mod system_time;
mod vdom_resources;

/// Response envelope for endpoints queried at a single scope.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub results: T,
}

/// Response envelope for `vdom=*` queries, which answer with one entry per
/// virtual domain.
#[derive(Debug, Deserialize)]
pub(crate) struct VdomEnvelope<T> {
    pub vdom: String,
    pub results: T,
}

type ProbeFuture = Pin<Box<dyn Future<Output = Result<Vec<Observation>, ProbeError>> + Send>>;
type ProbeFn = fn(Arc<FortiClient>) -> ProbeFuture;

/// The fixed ordered battery of probe routines run on every scrape.
static REGISTRY: &[(&str, ProbeFn)] = &[
    ("system_status", |c| Box::pin(async move { system_status::probe(&c).await })),
    ("system_resources", |c| Box::pin(async move { system_resources::probe(&c).await })),
    ("vdom_resources", |c| Box::pin(async move { vdom_resources::probe(&c).await })),
    ("interfaces", |c| Box::pin(async move { interfaces::probe(&c).await })),
    ("ipsec_tunnels", |c| Box::pin(async move { ipsec_tunnels::probe(&c).await })),
    ("ssl_vpn_sessions", |c| Box::pin(async move { ssl_vpn_sessions::probe(&c).await })),
    ("firewall_policies", |c| Box::pin(async move { firewall_policies::probe(&c).await })),
    ("license", |c| Box::pin(async move { license::probe(&c).await })),
    ("ha_statistics", |c| Box::pin(async move { ha_statistics::probe(&c).await })),
    ("link_monitor", |c| Box::pin(async move { link_monitor::probe(&c).await })),
    ("certificates", |c| Box::pin(async move { certificates::probe(&c).await })),
    ("fortimanager_status", |c| Box::pin(async move { fortimanager_status::probe(&c).await })),
    ("sensor_info", |c| Box::pin(async move { sensor_info::probe(&c).await })),
    ("log_disk_usage", |c| Box::pin(async move { log_disk_usage::probe(&c).await })),
    ("system_time", |c| Box::pin(async move { system_time::probe(&c).await })),
];

/// Number of probe routines in the battery.
pub fn probe_count() -> usize {
    REGISTRY.len()
}

/// Normalize a raw target URL to `scheme://host[:port]`.
///
/// Path, query, and fragment are stripped before any client construction;
/// only http and https are allowed.
pub fn normalize_target(raw: &str) -> Result<String, ScrapeError> {
    let url = Url::parse(raw).map_err(|e| ScrapeError::InvalidTarget(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(ScrapeError::UnsupportedScheme(other.to_owned())),
    }
    let host = url
        .host_str()
        .ok_or_else(|| ScrapeError::InvalidTarget("missing host".to_owned()))?;
    Ok(match url.port() {
        Some(port) => format!("{}://{host}:{port}", url.scheme()),
        None => format!("{}://{host}", url.scheme()),
    })
}

/// Run one full scrape against `raw_target`.
///
/// Fatal errors (bad URL, disallowed scheme, unknown target) abort before
/// any probe runs. Everything past that point is best effort: the returned
/// snapshot carries whatever the successful probes gathered, with
/// `success = false` iff at least one probe failed.
pub async fn probe_target(
    raw_target: &str,
    auth: &AuthKeys,
    http: &reqwest::Client,
) -> Result<Snapshot, ScrapeError> {
    let target = normalize_target(raw_target)?;
    let token = auth
        .token_for(&target)
        .ok_or_else(|| ScrapeError::UnknownTarget(target.clone()))?;
    let base = Url::parse(&target).map_err(|e| ScrapeError::InvalidTarget(e.to_string()))?;
    let client = Arc::new(FortiClient::new(base, token.to_owned(), http.clone()));

    let mut tasks = JoinSet::new();
    for (index, (name, run)) in REGISTRY.iter().enumerate() {
        let client = Arc::clone(&client);
        tasks.spawn(async move { (index, *name, run(client).await) });
    }

    let mut reports: Vec<Option<ProbeReport>> = (0..REGISTRY.len()).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        let Ok((index, name, outcome)) = joined else {
            // A panicked or cancelled probe task surfaces as a missing
            // report below, which counts as a failure.
            continue;
        };
        reports[index] = Some(match outcome {
            Ok(observations) => ProbeReport {
                probe: name,
                success: true,
                observations,
            },
            Err(err) => {
                warn!(probe = name, target = %target, error = %err, "probe failed");
                ProbeReport {
                    probe: name,
                    success: false,
                    observations: Vec::new(),
                }
            }
        });
    }

    let mut snapshot = Snapshot::new();
    for report in reports {
        match report {
            Some(report) => snapshot.absorb(report),
            None => snapshot.success = false,
        }
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_to_scheme_and_host() {
        assert_eq!(
            normalize_target("https://host/some/path?x=1").unwrap(),
            "https://host"
        );
        assert_eq!(
            normalize_target("http://10.0.0.1:8443/api").unwrap(),
            "http://10.0.0.1:8443"
        );
        assert_eq!(
            normalize_target("https://fw.example.com").unwrap(),
            "https://fw.example.com"
        );
    }

    #[test]
    fn rejects_bad_targets() {
        assert!(matches!(
            normalize_target("ftp://host"),
            Err(ScrapeError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            normalize_target("not a url"),
            Err(ScrapeError::InvalidTarget(_))
        ));
    }
}
