//! Log disk probe: used and total log disk space per VDOM.
//!
//! The device reports MiB; values are rescaled to bytes.

use serde::Deserialize;

use super::VdomEnvelope;
use crate::client::FortiClient;
use crate::error::ProbeError;
use crate::metrics::{MetricDesc, Observation};

const MIB: f64 = 1024.0 * 1024.0;

static DISK_USED: MetricDesc = MetricDesc::gauge(
    "fortigate_log_disk_used_bytes",
    "Log disk space currently in use.",
    &["vdom"],
);
static DISK_TOTAL: MetricDesc = MetricDesc::gauge(
    "fortigate_log_disk_total_bytes",
    "Total log disk space.",
    &["vdom"],
);

#[derive(Debug, Deserialize)]
struct DiskUsage {
    used: f64,
    total: f64,
}

pub(super) async fn probe(client: &FortiClient) -> Result<Vec<Observation>, ProbeError> {
    let envelopes: Vec<VdomEnvelope<DiskUsage>> = client
        .get("api/v2/monitor/log/current-disk-usage", "vdom=*")
        .await?;

    let mut observations = Vec::new();
    for envelope in &envelopes {
        let vdom = [envelope.vdom.as_str()];
        observations.push(DISK_USED.observe(&vdom, envelope.results.used * MIB));
        observations.push(DISK_TOTAL.observe(&vdom, envelope.results.total * MIB));
    }
    Ok(observations)
}
