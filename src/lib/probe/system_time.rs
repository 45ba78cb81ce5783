//! System clock probe.

use serde::Deserialize;

use super::Envelope;
use crate::client::FortiClient;
use crate::error::ProbeError;
use crate::metrics::{MetricDesc, Observation};

static SYSTEM_TIME: MetricDesc = MetricDesc::gauge(
    "fortigate_time_seconds",
    "System clock of the device as a Unix timestamp.",
    &[],
);

#[derive(Debug, Deserialize)]
struct SystemTime {
    time: f64,
}

pub(super) async fn probe(client: &FortiClient) -> Result<Vec<Observation>, ProbeError> {
    let time: Envelope<SystemTime> = client
        .get("api/v2/monitor/system/time", "scope=global")
        .await?;
    Ok(vec![SYSTEM_TIME.observe::<&str>(&[], time.results.time)])
}
