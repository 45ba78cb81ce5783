//! Firewall policy probe: live per-policy statistics joined with the
//! declared configuration to recover policy names.
//!
//! The API shape is firmware dependent. From 6.4 the device reports IPv4 and
//! IPv6 policies through one combined endpoint selected with an
//! `ip_version` parameter; older firmware exposes a separate `policy6`
//! endpoint pair. The probe fetches `system/status` first and parses the
//! firmware version to pick the variant, so the two calls of one scrape
//! always agree.
//!
//! Statistics are keyed by numeric policy id plus a stable `uuid`; the
//! config listing carries the same uuid and the human name. Live stats may
//! reference policies deleted after the config snapshot, so an unmatched
//! uuid still emits the full metric set with an empty name. Policy id 0 is
//! the implicit deny rule: it has no config entry and always gets the fixed
//! name "Implicit Deny".

use serde::Deserialize;
use std::collections::HashMap;

use super::VdomEnvelope;
use crate::client::FortiClient;
use crate::error::ProbeError;
use crate::metrics::{MetricDesc, Observation};
use crate::version::SystemVersion;

const IMPLICIT_DENY_NAME: &str = "Implicit Deny";

static POLICY_LABELS: &[&str] = &["vdom", "protocol", "name", "uuid", "id"];

static ACTIVE_SESSIONS: MetricDesc = MetricDesc::gauge(
    "fortigate_policy_active_sessions",
    "Number of sessions currently active on the policy.",
    POLICY_LABELS,
);
static POLICY_BYTES: MetricDesc = MetricDesc::counter(
    "fortigate_policy_bytes_total",
    "Number of bytes that matched the policy.",
    POLICY_LABELS,
);
static POLICY_PACKETS: MetricDesc = MetricDesc::counter(
    "fortigate_policy_packets_total",
    "Number of packets that matched the policy.",
    POLICY_LABELS,
);
static POLICY_HITS: MetricDesc = MetricDesc::counter(
    "fortigate_policy_hit_count_total",
    "Number of times the policy matched new traffic.",
    POLICY_LABELS,
);

#[derive(Debug, Deserialize)]
struct FirmwareStatus {
    version: String,
}

#[derive(Debug, Deserialize)]
struct PolicyStats {
    policyid: u64,
    #[serde(default)]
    uuid: String,
    #[serde(default)]
    active_sessions: f64,
    #[serde(default)]
    bytes: f64,
    #[serde(default)]
    packets: f64,
    #[serde(default)]
    hit_count: f64,
}

#[derive(Debug, Deserialize)]
struct PolicyConfig {
    uuid: String,
    #[serde(default)]
    name: String,
}

fn emit(
    observations: &mut Vec<Observation>,
    envelopes: &[VdomEnvelope<Vec<PolicyStats>>],
    names: &HashMap<&str, &str>,
    protocol: &str,
) {
    for envelope in envelopes {
        for stats in &envelope.results {
            let name = if stats.policyid == 0 {
                IMPLICIT_DENY_NAME
            } else {
                names.get(stats.uuid.as_str()).copied().unwrap_or("")
            };
            let id = stats.policyid.to_string();
            let labels = [
                envelope.vdom.as_str(),
                protocol,
                name,
                stats.uuid.as_str(),
                id.as_str(),
            ];
            observations.push(ACTIVE_SESSIONS.observe(&labels, stats.active_sessions));
            observations.push(POLICY_BYTES.observe(&labels, stats.bytes));
            observations.push(POLICY_PACKETS.observe(&labels, stats.packets));
            observations.push(POLICY_HITS.observe(&labels, stats.hit_count));
        }
    }
}

pub(super) async fn probe(client: &FortiClient) -> Result<Vec<Observation>, ProbeError> {
    let status: FirmwareStatus = client.get("api/v2/monitor/system/status", "").await?;
    let version = SystemVersion::parse(&status.version)
        .ok_or_else(|| ProbeError::Version(status.version.clone()))?;
    let combined = version.at_least(6, 4);

    let (stats_v4, stats_v6): (
        Vec<VdomEnvelope<Vec<PolicyStats>>>,
        Vec<VdomEnvelope<Vec<PolicyStats>>>,
    ) = if combined {
        (
            client
                .get("api/v2/monitor/firewall/policy/select", "vdom=*&ip_version=ipv4")
                .await?,
            client
                .get("api/v2/monitor/firewall/policy/select", "vdom=*&ip_version=ipv6")
                .await?,
        )
    } else {
        (
            client
                .get("api/v2/monitor/firewall/policy/select", "vdom=*")
                .await?,
            client
                .get("api/v2/monitor/firewall/policy6/select", "vdom=*")
                .await?,
        )
    };

    let config_v4: Vec<VdomEnvelope<Vec<PolicyConfig>>> = client
        .get("api/v2/cmdb/firewall/policy", "vdom=*&format=policyid|name|uuid")
        .await?;
    // Pre-6.4 firmware keeps IPv6 policies in a separate config table.
    let config_v6: Vec<VdomEnvelope<Vec<PolicyConfig>>> = if combined {
        Vec::new()
    } else {
        client
            .get("api/v2/cmdb/firewall/policy6", "vdom=*&format=policyid|name|uuid")
            .await?
    };

    let mut names: HashMap<&str, &str> = HashMap::new();
    for envelope in config_v4.iter().chain(config_v6.iter()) {
        for policy in &envelope.results {
            names.insert(policy.uuid.as_str(), policy.name.as_str());
        }
    }

    let mut observations = Vec::new();
    emit(&mut observations, &stats_v4, &names, "ipv4");
    emit(&mut observations, &stats_v6, &names, "ipv6");
    Ok(observations)
}
