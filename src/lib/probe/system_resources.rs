//! Global resource usage probe: per-core CPU, memory, and session count.
//!
//! The device reports each resource as a time series array of `{current}`
//! entries. For CPU the first entry is the system-wide average and the rest
//! are individual cores; the average is skipped and cores are labeled with
//! their zero-based index among the remaining entries.

use serde::Deserialize;

use super::Envelope;
use crate::client::FortiClient;
use crate::error::ProbeError;
use crate::metrics::{MetricDesc, Observation};

static CPU_USAGE: MetricDesc = MetricDesc::gauge(
    "fortigate_cpu_usage_ratio",
    "Current CPU usage ratio, per processor core.",
    &["processor"],
);
static MEMORY_USAGE: MetricDesc = MetricDesc::gauge(
    "fortigate_memory_usage_ratio",
    "Current memory usage ratio.",
    &[],
);
static CURRENT_SESSIONS: MetricDesc = MetricDesc::gauge(
    "fortigate_current_sessions",
    "Number of sessions currently active.",
    &[],
);

#[derive(Debug, Deserialize)]
struct UsagePoint {
    current: f64,
}

#[derive(Debug, Deserialize)]
struct ResourceUsage {
    #[serde(default)]
    cpu: Vec<UsagePoint>,
    #[serde(default)]
    mem: Vec<UsagePoint>,
    #[serde(default)]
    session: Vec<UsagePoint>,
}

fn derive(results: &ResourceUsage) -> Vec<Observation> {
    let mut observations = Vec::new();
    // Index 0 is the average across all cores; skip it.
    for (core, point) in results.cpu.iter().skip(1).enumerate() {
        observations.push(CPU_USAGE.observe(&[core.to_string()], point.current / 100.0));
    }
    if let Some(mem) = results.mem.first() {
        observations.push(MEMORY_USAGE.observe::<&str>(&[], mem.current / 100.0));
    }
    if let Some(session) = results.session.first() {
        observations.push(CURRENT_SESSIONS.observe::<&str>(&[], session.current));
    }
    observations
}

pub(super) async fn probe(client: &FortiClient) -> Result<Vec<Observation>, ProbeError> {
    let usage: Envelope<ResourceUsage> = client
        .get(
            "api/v2/monitor/system/resource/usage",
            "interval=1-min&scope=global",
        )
        .await?;
    Ok(derive(&usage.results))
}
