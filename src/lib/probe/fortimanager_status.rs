//! FortiManager probe: central-management connection and registration
//! state, expanded into one 0/1 gauge per possible state.

use serde::Deserialize;

use super::Envelope;
use crate::client::FortiClient;
use crate::error::ProbeError;
use crate::metrics::{MetricDesc, Observation};

const CONNECTION_STATES: &[&str] = &["up", "down", "handshake", "unknown"];
const REGISTRATION_STATES: &[&str] = &["registered", "unregistered", "inprogress", "unknown"];

static CONNECTION_STATUS: MetricDesc = MetricDesc::gauge(
    "fortigate_fortimanager_connection_status",
    "Whether the FortiManager connection is in the given state.",
    &["status"],
);
static REGISTRATION_STATUS: MetricDesc = MetricDesc::gauge(
    "fortigate_fortimanager_registration_status",
    "Whether the FortiManager registration is in the given state.",
    &["status"],
);

#[derive(Debug, Deserialize)]
struct FortimanagerStatus {
    #[serde(default)]
    fortimanager_status: String,
    #[serde(default)]
    fortimanager_registration_status: String,
}

fn expand(
    desc: &'static MetricDesc,
    states: &'static [&'static str],
    device_state: &str,
) -> Vec<Observation> {
    let state = states
        .iter()
        .copied()
        .find(|s| *s == device_state)
        .unwrap_or("unknown");
    states
        .iter()
        .map(|candidate| desc.observe(&[candidate], if *candidate == state { 1.0 } else { 0.0 }))
        .collect()
}

pub(super) async fn probe(client: &FortiClient) -> Result<Vec<Observation>, ProbeError> {
    let status: Envelope<FortimanagerStatus> = client
        .get("api/v2/monitor/system/fortimanager/status", "scope=global")
        .await?;

    let mut observations = expand(
        &CONNECTION_STATUS,
        CONNECTION_STATES,
        &status.results.fortimanager_status,
    );
    observations.extend(expand(
        &REGISTRATION_STATUS,
        REGISTRATION_STATES,
        &status.results.fortimanager_registration_status,
    ));
    Ok(observations)
}
