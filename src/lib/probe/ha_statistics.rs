//! High-availability probe: per-member identity and load statistics,
//! cross-referenced with the configured HA group name.

use serde::Deserialize;

use super::Envelope;
use crate::client::FortiClient;
use crate::error::ProbeError;
use crate::metrics::{MetricDesc, Observation};

static MEMBER_INFO: MetricDesc = MetricDesc::gauge(
    "fortigate_ha_member_info",
    "Identity of a cluster member.",
    &["hostname", "serial", "group"],
);
static MEMBER_CPU: MetricDesc = MetricDesc::gauge(
    "fortigate_ha_member_cpu_usage_ratio",
    "CPU usage ratio of the cluster member.",
    &["hostname"],
);
static MEMBER_MEMORY: MetricDesc = MetricDesc::gauge(
    "fortigate_ha_member_memory_usage_ratio",
    "Memory usage ratio of the cluster member.",
    &["hostname"],
);
static MEMBER_SESSIONS: MetricDesc = MetricDesc::gauge(
    "fortigate_ha_member_sessions",
    "Number of sessions active on the cluster member.",
    &["hostname"],
);
static MEMBER_PACKETS: MetricDesc = MetricDesc::counter(
    "fortigate_ha_member_packets_total",
    "Number of packets processed by the cluster member.",
    &["hostname"],
);
static MEMBER_BYTES: MetricDesc = MetricDesc::counter(
    "fortigate_ha_member_bytes_total",
    "Number of bytes processed by the cluster member.",
    &["hostname"],
);
static MEMBER_VIRUS_EVENTS: MetricDesc = MetricDesc::counter(
    "fortigate_ha_member_virus_events_total",
    "Number of virus events detected by the cluster member.",
    &["hostname"],
);

#[derive(Debug, Deserialize)]
struct HaMember {
    hostname: String,
    serial_no: String,
    #[serde(default)]
    cpu_usage: f64,
    #[serde(default)]
    mem_usage: f64,
    #[serde(default)]
    sessions: f64,
    #[serde(default)]
    tpacket: f64,
    #[serde(default)]
    tbyte: f64,
    #[serde(default)]
    vir_usage: f64,
}

#[derive(Debug, Deserialize)]
struct HaConfig {
    #[serde(rename = "group-name", default)]
    group_name: String,
}

pub(super) async fn probe(client: &FortiClient) -> Result<Vec<Observation>, ProbeError> {
    let stats: Envelope<Vec<HaMember>> = client
        .get("api/v2/monitor/system/ha-statistics", "")
        .await?;
    let config: Envelope<HaConfig> = client.get("api/v2/cmdb/system/ha", "").await?;
    let group = config.results.group_name;

    let mut observations = Vec::new();
    for member in &stats.results {
        let hostname = [member.hostname.as_str()];
        observations.push(MEMBER_INFO.observe(
            &[member.hostname.as_str(), member.serial_no.as_str(), group.as_str()],
            1.0,
        ));
        observations.push(MEMBER_CPU.observe(&hostname, member.cpu_usage / 100.0));
        observations.push(MEMBER_MEMORY.observe(&hostname, member.mem_usage / 100.0));
        observations.push(MEMBER_SESSIONS.observe(&hostname, member.sessions));
        observations.push(MEMBER_PACKETS.observe(&hostname, member.tpacket));
        observations.push(MEMBER_BYTES.observe(&hostname, member.tbyte));
        observations.push(MEMBER_VIRUS_EVENTS.observe(&hostname, member.vir_usage));
    }
    Ok(observations)
}
