//! SSL-VPN probe: number of connected clients per VDOM.

use serde_json::Value;

use super::VdomEnvelope;
use crate::client::FortiClient;
use crate::error::ProbeError;
use crate::metrics::{MetricDesc, Observation};

static VPN_CONNECTIONS: MetricDesc = MetricDesc::gauge(
    "fortigate_vpn_connections",
    "Number of SSL-VPN connections.",
    &["vdom"],
);

pub(super) async fn probe(client: &FortiClient) -> Result<Vec<Observation>, ProbeError> {
    // Only the session count matters here, so entries are left opaque.
    let envelopes: Vec<VdomEnvelope<Vec<Value>>> =
        client.get("api/v2/monitor/vpn/ssl", "vdom=*").await?;

    Ok(envelopes
        .iter()
        .map(|envelope| {
            VPN_CONNECTIONS.observe(&[envelope.vdom.as_str()], envelope.results.len() as f64)
        })
        .collect())
}
