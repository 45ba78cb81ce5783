//! Per-VDOM resource usage probe.

use serde::Deserialize;

use super::VdomEnvelope;
use crate::client::FortiClient;
use crate::error::ProbeError;
use crate::metrics::{MetricDesc, Observation};

static VDOM_CPU: MetricDesc = MetricDesc::gauge(
    "fortigate_vdom_cpu_usage_ratio",
    "Current CPU usage ratio of the virtual domain.",
    &["vdom"],
);
static VDOM_MEMORY: MetricDesc = MetricDesc::gauge(
    "fortigate_vdom_memory_usage_ratio",
    "Current memory usage ratio of the virtual domain.",
    &["vdom"],
);
static VDOM_SESSIONS: MetricDesc = MetricDesc::gauge(
    "fortigate_vdom_current_sessions",
    "Number of sessions currently active in the virtual domain.",
    &["vdom"],
);

#[derive(Debug, Deserialize)]
struct SessionUsage {
    current_usage: f64,
}

#[derive(Debug, Deserialize)]
struct VdomResource {
    cpu: f64,
    memory: f64,
    sessions: SessionUsage,
}

pub(super) async fn probe(client: &FortiClient) -> Result<Vec<Observation>, ProbeError> {
    let envelopes: Vec<VdomEnvelope<VdomResource>> = client
        .get("api/v2/monitor/system/vdom-resource", "vdom=*")
        .await?;

    let mut observations = Vec::new();
    for envelope in &envelopes {
        let vdom = [envelope.vdom.as_str()];
        observations.push(VDOM_CPU.observe(&vdom, envelope.results.cpu / 100.0));
        observations.push(VDOM_MEMORY.observe(&vdom, envelope.results.memory / 100.0));
        observations.push(VDOM_SESSIONS.observe(&vdom, envelope.results.sessions.current_usage));
    }
    Ok(observations)
}
