//! Network interface probe: link state, negotiated speed, and traffic
//! counters per interface per VDOM.

use serde::Deserialize;
use std::collections::HashMap;

use super::VdomEnvelope;
use crate::client::FortiClient;
use crate::error::ProbeError;
use crate::metrics::{MetricDesc, Observation};

static LINK_UP: MetricDesc = MetricDesc::gauge(
    "fortigate_interface_link_up",
    "Whether the link is up or not.",
    &["vdom", "name", "alias"],
);
static SPEED_BPS: MetricDesc = MetricDesc::gauge(
    "fortigate_interface_speed_bps",
    "Speed negotiated on the port, in bits per second.",
    &["vdom", "name", "alias"],
);
static TX_PACKETS: MetricDesc = MetricDesc::counter(
    "fortigate_interface_transmit_packets_total",
    "Number of packets transmitted on the interface.",
    &["vdom", "name", "alias"],
);
static RX_PACKETS: MetricDesc = MetricDesc::counter(
    "fortigate_interface_receive_packets_total",
    "Number of packets received on the interface.",
    &["vdom", "name", "alias"],
);
static TX_BYTES: MetricDesc = MetricDesc::counter(
    "fortigate_interface_transmit_bytes_total",
    "Number of bytes transmitted on the interface.",
    &["vdom", "name", "alias"],
);
static RX_BYTES: MetricDesc = MetricDesc::counter(
    "fortigate_interface_receive_bytes_total",
    "Number of bytes received on the interface.",
    &["vdom", "name", "alias"],
);
static TX_ERRORS: MetricDesc = MetricDesc::counter(
    "fortigate_interface_transmit_errors_total",
    "Number of transmission errors detected on the interface.",
    &["vdom", "name", "alias"],
);
static RX_ERRORS: MetricDesc = MetricDesc::counter(
    "fortigate_interface_receive_errors_total",
    "Number of reception errors detected on the interface.",
    &["vdom", "name", "alias"],
);

#[derive(Debug, Deserialize)]
struct Interface {
    name: String,
    #[serde(default)]
    alias: String,
    link: bool,
    /// Negotiated speed in Mbit/s.
    speed: f64,
    tx_packets: f64,
    rx_packets: f64,
    tx_bytes: f64,
    rx_bytes: f64,
    tx_errors: f64,
    rx_errors: f64,
}

pub(super) async fn probe(client: &FortiClient) -> Result<Vec<Observation>, ProbeError> {
    let envelopes: Vec<VdomEnvelope<HashMap<String, Interface>>> = client
        .get(
            "api/v2/monitor/system/interface/select",
            "include_vlan=true&include_aggregate=true&vdom=*",
        )
        .await?;

    let mut observations = Vec::new();
    for envelope in &envelopes {
        // Results arrive keyed by interface name; sort for stable output.
        let mut interfaces: Vec<&Interface> = envelope.results.values().collect();
        interfaces.sort_by(|a, b| a.name.cmp(&b.name));

        for iface in interfaces {
            let labels = [envelope.vdom.as_str(), iface.name.as_str(), iface.alias.as_str()];
            observations.push(LINK_UP.observe(&labels, if iface.link { 1.0 } else { 0.0 }));
            observations.push(SPEED_BPS.observe(&labels, iface.speed * 1_000_000.0));
            // Counters are reported even when the link is down.
            observations.push(TX_PACKETS.observe(&labels, iface.tx_packets));
            observations.push(RX_PACKETS.observe(&labels, iface.rx_packets));
            observations.push(TX_BYTES.observe(&labels, iface.tx_bytes));
            observations.push(RX_BYTES.observe(&labels, iface.rx_bytes));
            observations.push(TX_ERRORS.observe(&labels, iface.tx_errors));
            observations.push(RX_ERRORS.observe(&labels, iface.rx_errors));
        }
    }
    Ok(observations)
}
