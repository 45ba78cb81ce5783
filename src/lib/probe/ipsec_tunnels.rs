//! IPsec VPN probe: phase-2 tunnel state and traffic per VDOM.

use serde::Deserialize;

use super::VdomEnvelope;
use crate::client::FortiClient;
use crate::error::ProbeError;
use crate::metrics::{MetricDesc, Observation};

static TUNNEL_UP: MetricDesc = MetricDesc::gauge(
    "fortigate_ipsec_tunnel_up",
    "Whether the IPsec tunnel is up.",
    &["vdom", "name", "p2name"],
);
static TUNNEL_RX_BYTES: MetricDesc = MetricDesc::counter(
    "fortigate_ipsec_tunnel_receive_bytes_total",
    "Number of bytes received over the IPsec tunnel.",
    &["vdom", "name", "p2name"],
);
static TUNNEL_TX_BYTES: MetricDesc = MetricDesc::counter(
    "fortigate_ipsec_tunnel_transmit_bytes_total",
    "Number of bytes transmitted over the IPsec tunnel.",
    &["vdom", "name", "p2name"],
);

#[derive(Debug, Deserialize)]
struct Phase2 {
    p2name: String,
    status: String,
    #[serde(default)]
    incoming_bytes: f64,
    #[serde(default)]
    outgoing_bytes: f64,
}

#[derive(Debug, Deserialize)]
struct Tunnel {
    name: String,
    #[serde(default)]
    proxyid: Vec<Phase2>,
}

pub(super) async fn probe(client: &FortiClient) -> Result<Vec<Observation>, ProbeError> {
    let envelopes: Vec<VdomEnvelope<Vec<Tunnel>>> =
        client.get("api/v2/monitor/vpn/ipsec", "vdom=*").await?;

    let mut observations = Vec::new();
    for envelope in &envelopes {
        for tunnel in &envelope.results {
            for phase2 in &tunnel.proxyid {
                let labels = [
                    envelope.vdom.as_str(),
                    tunnel.name.as_str(),
                    phase2.p2name.as_str(),
                ];
                let up = if phase2.status == "up" { 1.0 } else { 0.0 };
                observations.push(TUNNEL_UP.observe(&labels, up));
                observations.push(TUNNEL_RX_BYTES.observe(&labels, phase2.incoming_bytes));
                observations.push(TUNNEL_TX_BYTES.observe(&labels, phase2.outgoing_bytes));
            }
        }
    }
    Ok(observations)
}
