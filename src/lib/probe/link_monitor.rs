//! Link monitor probe: health of monitored WAN links per VDOM.
//!
//! The device reports the link state as a string. The exposition format has
//! no enum type, so the state is expanded into one 0/1 gauge per possible
//! state; strings the exporter does not recognize land on `unknown`.
//! Numeric fields are absent while a link is down and are emitted only when
//! the device reports them.

use serde::Deserialize;
use std::collections::BTreeMap;

use super::VdomEnvelope;
use crate::client::FortiClient;
use crate::error::ProbeError;
use crate::metrics::{MetricDesc, Observation};

/// Possible link states. Device strings outside this list count as
/// `unknown`.
const LINK_STATES: &[&str] = &["up", "down", "error", "disable", "unknown"];

static LINK_LABELS: &[&str] = &["vdom", "monitor", "interface"];

static LINK_STATUS: MetricDesc = MetricDesc::gauge(
    "fortigate_link_status",
    "Whether the monitored link is in the given state.",
    &["vdom", "monitor", "interface", "state"],
);
static LINK_LATENCY: MetricDesc = MetricDesc::gauge(
    "fortigate_link_latency_seconds",
    "Round-trip latency measured on the link.",
    LINK_LABELS,
);
static LINK_JITTER: MetricDesc = MetricDesc::gauge(
    "fortigate_link_jitter_seconds",
    "Jitter measured on the link.",
    LINK_LABELS,
);
static LINK_PACKET_LOSS: MetricDesc = MetricDesc::gauge(
    "fortigate_link_packet_loss_ratio",
    "Packet loss ratio measured on the link.",
    LINK_LABELS,
);
static LINK_PACKET_SENT: MetricDesc = MetricDesc::counter(
    "fortigate_link_packet_sent_total",
    "Number of probe packets sent on the link.",
    LINK_LABELS,
);
static LINK_PACKET_RECEIVED: MetricDesc = MetricDesc::counter(
    "fortigate_link_packet_received_total",
    "Number of probe packets received on the link.",
    LINK_LABELS,
);
static LINK_SESSIONS: MetricDesc = MetricDesc::gauge(
    "fortigate_link_active_sessions",
    "Number of sessions active on the link.",
    LINK_LABELS,
);
static LINK_BANDWIDTH_RX: MetricDesc = MetricDesc::gauge(
    "fortigate_link_bandwidth_rx_byte_per_second",
    "Inbound bandwidth currently used on the link.",
    LINK_LABELS,
);
static LINK_BANDWIDTH_TX: MetricDesc = MetricDesc::gauge(
    "fortigate_link_bandwidth_tx_byte_per_second",
    "Outbound bandwidth currently used on the link.",
    LINK_LABELS,
);
static LINK_STATUS_CHANGED: MetricDesc = MetricDesc::gauge(
    "fortigate_link_status_change_time_seconds",
    "Unix timestamp of the last status change on the link.",
    LINK_LABELS,
);

#[derive(Debug, Deserialize)]
struct LinkHealth {
    status: String,
    /// Milliseconds.
    latency: Option<f64>,
    /// Milliseconds.
    jitter: Option<f64>,
    /// Percentage, 0-100.
    packet_loss: Option<f64>,
    packet_sent: Option<f64>,
    packet_received: Option<f64>,
    session: Option<f64>,
    /// kbit/s.
    tx_bandwidth: Option<f64>,
    /// kbit/s.
    rx_bandwidth: Option<f64>,
    state_changed: Option<f64>,
}

/// `vdom=*` results: monitor name -> interface name -> health. BTreeMap
/// keeps the emitted order stable.
type LinkMonitors = BTreeMap<String, BTreeMap<String, LinkHealth>>;

fn normalized_state(device_state: &str) -> &'static str {
    LINK_STATES
        .iter()
        .copied()
        .find(|s| *s == device_state)
        .unwrap_or("unknown")
}

pub(super) async fn probe(client: &FortiClient) -> Result<Vec<Observation>, ProbeError> {
    let envelopes: Vec<VdomEnvelope<LinkMonitors>> = client
        .get("api/v2/monitor/system/link-monitor", "vdom=*")
        .await?;

    let mut observations = Vec::new();
    for envelope in &envelopes {
        for (monitor, interfaces) in &envelope.results {
            for (interface, health) in interfaces {
                let labels = [envelope.vdom.as_str(), monitor.as_str(), interface.as_str()];
                let state = normalized_state(&health.status);
                for candidate in LINK_STATES.iter().copied() {
                    observations.push(LINK_STATUS.observe(
                        &[labels[0], labels[1], labels[2], candidate],
                        if candidate == state { 1.0 } else { 0.0 },
                    ));
                }

                let mut gauge = |desc: &'static MetricDesc, value: Option<f64>| {
                    if let Some(value) = value {
                        observations.push(desc.observe(&labels, value));
                    }
                };
                gauge(&LINK_LATENCY, health.latency.map(|ms| ms / 1000.0));
                gauge(&LINK_JITTER, health.jitter.map(|ms| ms / 1000.0));
                gauge(&LINK_PACKET_LOSS, health.packet_loss.map(|pct| pct / 100.0));
                gauge(&LINK_PACKET_SENT, health.packet_sent);
                gauge(&LINK_PACKET_RECEIVED, health.packet_received);
                gauge(&LINK_SESSIONS, health.session);
                // Device reports bandwidth in kbit/s.
                gauge(
                    &LINK_BANDWIDTH_RX,
                    health.rx_bandwidth.map(|kbps| kbps * 1000.0 / 8.0),
                );
                gauge(
                    &LINK_BANDWIDTH_TX,
                    health.tx_bandwidth.map(|kbps| kbps * 1000.0 / 8.0),
                );
                gauge(&LINK_STATUS_CHANGED, health.state_changed);
            }
        }
    }
    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognized_states_pass_through() {
        for state in ["up", "down", "error", "disable"] {
            assert_eq!(normalized_state(state), state);
        }
    }

    #[test]
    fn unrecognized_state_maps_to_unknown() {
        assert_eq!(normalized_state("flapping"), "unknown");
        assert_eq!(normalized_state(""), "unknown");
    }
}
