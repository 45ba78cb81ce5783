//! License probe: VDOM license usage against the licensed maximum.

use serde::Deserialize;

use super::Envelope;
use crate::client::FortiClient;
use crate::error::ProbeError;
use crate::metrics::{MetricDesc, Observation};

static VDOM_USAGE: MetricDesc = MetricDesc::gauge(
    "fortigate_license_vdom_usage",
    "Number of virtual domains in use.",
    &[],
);
static VDOM_MAX: MetricDesc = MetricDesc::gauge(
    "fortigate_license_vdom_max",
    "Maximum number of virtual domains permitted by the license.",
    &[],
);

#[derive(Debug, Deserialize)]
struct VdomLicense {
    used: f64,
    max: f64,
}

#[derive(Debug, Deserialize)]
struct LicenseStatus {
    vdom: Option<VdomLicense>,
}

pub(super) async fn probe(client: &FortiClient) -> Result<Vec<Observation>, ProbeError> {
    let status: Envelope<LicenseStatus> = client
        .get("api/v2/monitor/license/status", "scope=global")
        .await?;
    let vdom = status
        .results
        .vdom
        .ok_or(ProbeError::Missing("vdom license block"))?;

    Ok(vec![
        VDOM_USAGE.observe::<&str>(&[], vdom.used),
        VDOM_MAX.observe::<&str>(&[], vdom.max),
    ])
}
