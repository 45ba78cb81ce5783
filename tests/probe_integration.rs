// End-to-end scrape tests against a mock FortiOS device.
//
// The mock is a real axum server on an ephemeral port, serving canned JSON
// per API path and recording every request so tests can assert which
// endpoint variants were called. This mirrors how the exporter talks to a
// live appliance: real sockets, real TLS-less HTTP, real serde decoding.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Json, Response},
    Router,
};
use serde_json::{json, Value};
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
};
use tokio::net::TcpListener;

use fortigate_exporter::{probe_target, AuthKeys, Observation, ScrapeError, Snapshot};

const TOKEN: &str = "test-token";

struct MockState {
    /// Canned bodies, keyed by path (or `path?query` for overrides that
    /// depend on the query).
    responses: HashMap<String, Value>,
    /// Paths that answer with an HTTP error instead of a body.
    errors: HashMap<String, u16>,
    /// Every `(path, query)` the device received.
    requests: Mutex<Vec<(String, String)>>,
}

async fn handle(State(state): State<Arc<MockState>>, request: Request<Body>) -> Response {
    let path = request.uri().path().to_owned();
    let query = request.uri().query().unwrap_or("").to_owned();
    state
        .requests
        .lock()
        .unwrap()
        .push((path.clone(), query.clone()));

    let authorized = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        == Some(&format!("Bearer {TOKEN}"));
    if !authorized {
        return StatusCode::FORBIDDEN.into_response();
    }

    if let Some(status) = state.errors.get(&path) {
        return StatusCode::from_u16(*status).unwrap().into_response();
    }

    let keyed = format!("{path}?{query}");
    match state
        .responses
        .get(&keyed)
        .or_else(|| state.responses.get(&path))
    {
        Some(body) => Json(body.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Start the mock device, returning its address and the request log.
async fn start_device(
    responses: HashMap<String, Value>,
    errors: HashMap<String, u16>,
) -> (SocketAddr, Arc<MockState>) {
    let state = Arc::new(MockState {
        responses,
        errors,
        requests: Mutex::new(Vec::new()),
    });
    let app = Router::new().fallback(handle).with_state(Arc::clone(&state));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, state)
}

/// Canned responses for a healthy single-VDOM device.
fn healthy_device(version: &str) -> HashMap<String, Value> {
    let mut responses = HashMap::new();
    responses.insert(
        "/api/v2/monitor/system/status".to_owned(),
        json!({"serial": "FGT61E123", "version": version, "build": 1337}),
    );
    responses.insert(
        "/api/v2/monitor/system/resource/usage".to_owned(),
        json!({"results": {
            "cpu": [{"current": 12}, {"current": 10}, {"current": 14}],
            "mem": [{"current": 70}],
            "session": [{"current": 123}]
        }}),
    );
    responses.insert(
        "/api/v2/monitor/system/vdom-resource".to_owned(),
        json!([{"vdom": "root", "results": {
            "cpu": 1, "memory": 25, "sessions": {"current_usage": 117}
        }}]),
    );
    responses.insert(
        "/api/v2/monitor/system/interface/select".to_owned(),
        json!([{"vdom": "root", "results": {
            "port1": {"name": "port1", "alias": "wan", "link": true, "speed": 1000.0,
                      "tx_packets": 100, "rx_packets": 200, "tx_bytes": 1000,
                      "rx_bytes": 2000, "tx_errors": 0, "rx_errors": 1},
            "port2": {"name": "port2", "alias": "", "link": false, "speed": 0.0,
                      "tx_packets": 5, "rx_packets": 6, "tx_bytes": 50,
                      "rx_bytes": 60, "tx_errors": 2, "rx_errors": 3}
        }}]),
    );
    responses.insert(
        "/api/v2/monitor/vpn/ipsec".to_owned(),
        json!([{"vdom": "root", "results": [{
            "name": "branch", "proxyid": [{"p2name": "branch-p2", "status": "up",
            "incoming_bytes": 10, "outgoing_bytes": 20}]
        }]}]),
    );
    responses.insert(
        "/api/v2/monitor/vpn/ssl".to_owned(),
        json!([{"vdom": "root", "results": [{"user": "alice"}, {"user": "bob"}]}]),
    );
    responses.insert(
        "/api/v2/monitor/firewall/policy/select".to_owned(),
        json!([{"vdom": "root", "results": [
            {"policyid": 0, "active_sessions": 1, "bytes": 2, "packets": 3, "hit_count": 4},
            {"policyid": 7, "uuid": "aa-bb", "active_sessions": 2, "bytes": 20,
             "packets": 30, "hit_count": 40},
            {"policyid": 9, "uuid": "gone-uuid", "active_sessions": 0, "bytes": 0,
             "packets": 0, "hit_count": 0}
        ]}]),
    );
    responses.insert(
        "/api/v2/cmdb/firewall/policy".to_owned(),
        json!([{"vdom": "root", "results": [
            {"policyid": 7, "uuid": "aa-bb", "name": "allow-dns"}
        ]}]),
    );
    responses.insert(
        "/api/v2/monitor/firewall/policy6/select".to_owned(),
        json!([{"vdom": "root", "results": [
            {"policyid": 11, "uuid": "cc-dd", "active_sessions": 1, "bytes": 6,
             "packets": 7, "hit_count": 8}
        ]}]),
    );
    responses.insert(
        "/api/v2/cmdb/firewall/policy6".to_owned(),
        json!([{"vdom": "root", "results": [
            {"policyid": 11, "uuid": "cc-dd", "name": "v6-rule"}
        ]}]),
    );
    responses.insert(
        "/api/v2/monitor/license/status".to_owned(),
        json!({"results": {"vdom": {"used": 2, "max": 10, "can_upgrade": false}}}),
    );
    responses.insert(
        "/api/v2/monitor/system/ha-statistics".to_owned(),
        json!({"results": [{
            "hostname": "fw-a", "serial_no": "FGT61E123", "cpu_usage": 5,
            "mem_usage": 40, "sessions": 100, "tpacket": 1000, "tbyte": 10000,
            "vir_usage": 2
        }]}),
    );
    responses.insert(
        "/api/v2/cmdb/system/ha".to_owned(),
        json!({"results": {"group-name": "cluster1"}}),
    );
    responses.insert(
        "/api/v2/monitor/system/link-monitor".to_owned(),
        json!([{"vdom": "root", "results": {"wan-mon": {"port1": {
            "status": "up", "latency": 3.1, "jitter": 0.5, "packet_loss": 1.0,
            "packet_sent": 100, "packet_received": 99, "session": 5,
            "tx_bandwidth": 800, "rx_bandwidth": 1600, "state_changed": 1600000000
        }}}}]),
    );
    responses.insert(
        "/api/v2/monitor/system/available-certificates".to_owned(),
        json!({"results": [{
            "name": "Fortinet_CA", "source": "factory", "status": "valid",
            "type": "local-ca", "valid_from": 1500000000, "valid_to": 1800000000
        }]}),
    );
    responses.insert(
        "/api/v2/monitor/system/fortimanager/status".to_owned(),
        json!({"results": {
            "fortimanager_status": "down",
            "fortimanager_registration_status": "unregistered"
        }}),
    );
    responses.insert(
        "/api/v2/monitor/system/sensor-info".to_owned(),
        json!({"results": [
            {"name": "CPU Temp", "type": "temperature", "value": 42.5, "alarm": false},
            {"name": "Fan 1", "type": "fan", "value": 4200, "alarm": true}
        ]}),
    );
    responses.insert(
        "/api/v2/monitor/log/current-disk-usage".to_owned(),
        json!([{"vdom": "root", "results": {"used": 100, "total": 200}}]),
    );
    responses.insert(
        "/api/v2/monitor/system/time".to_owned(),
        json!({"results": {"time": 1700000000}}),
    );
    responses
}

fn auth_for(addr: SocketAddr) -> AuthKeys {
    AuthKeys::from_pairs(&[(&format!("http://{addr}"), TOKEN)])
}

async fn scrape(addr: SocketAddr) -> Snapshot {
    scrape_url(&format!("http://{addr}"), addr).await
}

async fn scrape_url(target: &str, addr: SocketAddr) -> Snapshot {
    probe_target(target, &auth_for(addr), &reqwest::Client::new())
        .await
        .unwrap()
}

fn named<'a>(snapshot: &'a Snapshot, name: &str) -> Vec<&'a Observation> {
    snapshot
        .observations
        .iter()
        .filter(|o| o.desc.name == name)
        .collect()
}

#[test]
fn battery_holds_fifteen_probes() {
    assert_eq!(fortigate_exporter::probe::probe_count(), 15);
}

#[tokio::test]
async fn healthy_device_scrape_succeeds() {
    let (addr, _state) = start_device(healthy_device("v6.4.1"), HashMap::new()).await;
    let snapshot = scrape(addr).await;
    assert!(snapshot.success, "every probe should succeed");

    // One info gauge with the device identity.
    let version_info = named(&snapshot, "fortigate_version_info");
    assert_eq!(version_info.len(), 1);
    assert_eq!(version_info[0].label_values, vec!["FGT61E123", "v6.4.1", "1337"]);
    assert_eq!(version_info[0].value, 1.0);

    // CPU average skipped, remaining cores zero-indexed.
    let cpu = named(&snapshot, "fortigate_cpu_usage_ratio");
    assert_eq!(cpu.len(), 2);
    assert_eq!(cpu[0].label_values, vec!["0"]);
    assert_eq!(cpu[0].value, 0.10);
    assert_eq!(cpu[1].label_values, vec!["1"]);
    assert_eq!(cpu[1].value, 0.14);

    // SSL-VPN session count per VDOM.
    let vpn = named(&snapshot, "fortigate_vpn_connections");
    assert_eq!(vpn.len(), 1);
    assert_eq!(vpn[0].value, 2.0);

    // MiB rescaled to bytes.
    let disk_used = named(&snapshot, "fortigate_log_disk_used_bytes");
    assert_eq!(disk_used[0].value, 100.0 * 1024.0 * 1024.0);
}

#[tokio::test]
async fn interface_counters_survive_link_down() {
    let (addr, _state) = start_device(healthy_device("v6.4.1"), HashMap::new()).await;
    let snapshot = scrape(addr).await;

    let link = named(&snapshot, "fortigate_interface_link_up");
    let port2 = link
        .iter()
        .find(|o| o.label_values[1] == "port2")
        .expect("port2 link gauge");
    assert_eq!(port2.value, 0.0);

    for counter in [
        "fortigate_interface_transmit_packets_total",
        "fortigate_interface_receive_packets_total",
        "fortigate_interface_transmit_bytes_total",
        "fortigate_interface_receive_bytes_total",
        "fortigate_interface_transmit_errors_total",
        "fortigate_interface_receive_errors_total",
    ] {
        assert!(
            named(&snapshot, counter)
                .iter()
                .any(|o| o.label_values[1] == "port2"),
            "{counter} missing for downed port2"
        );
    }
}

#[tokio::test]
async fn modern_firmware_uses_combined_policy_endpoint() {
    let (addr, state) = start_device(healthy_device("v6.4.1"), HashMap::new()).await;
    let snapshot = scrape(addr).await;
    assert!(snapshot.success);

    let requests = state.requests.lock().unwrap();
    let policy_queries: Vec<&str> = requests
        .iter()
        .filter(|(path, _)| path == "/api/v2/monitor/firewall/policy/select")
        .map(|(_, query)| query.as_str())
        .collect();
    assert!(policy_queries.contains(&"vdom=*&ip_version=ipv4"));
    assert!(policy_queries.contains(&"vdom=*&ip_version=ipv6"));
    assert!(
        !requests
            .iter()
            .any(|(path, _)| path.contains("policy6")),
        "legacy policy6 endpoints must not be called on >= 6.4"
    );
    drop(requests);

    // Both protocols present, joined names and sentinels applied.
    let sessions = named(&snapshot, "fortigate_policy_active_sessions");
    assert!(sessions
        .iter()
        .any(|o| o.label_values[1] == "ipv4" && o.label_values[2] == "allow-dns"));
    assert!(sessions
        .iter()
        .any(|o| o.label_values[1] == "ipv6" && o.label_values[4] == "0"
            && o.label_values[2] == "Implicit Deny"));
    assert!(
        sessions
            .iter()
            .any(|o| o.label_values[3] == "gone-uuid" && o.label_values[2].is_empty()),
        "stats entry missing from config must emit with sentinel name"
    );
}

#[tokio::test]
async fn legacy_firmware_uses_separate_policy_endpoints() {
    let (addr, state) = start_device(healthy_device("v6.0.5"), HashMap::new()).await;
    let snapshot = scrape(addr).await;
    assert!(snapshot.success);

    let requests = state.requests.lock().unwrap();
    assert!(requests
        .iter()
        .any(|(path, query)| path == "/api/v2/monitor/firewall/policy6/select"
            && query == "vdom=*"));
    assert!(
        !requests.iter().any(|(_, query)| query.contains("ip_version")),
        "legacy firmware must not use the combined ip_version parameter"
    );
    drop(requests);

    let sessions = named(&snapshot, "fortigate_policy_active_sessions");
    assert!(sessions
        .iter()
        .any(|o| o.label_values[1] == "ipv6" && o.label_values[2] == "v6-rule"));
}

#[tokio::test]
async fn unparsable_firmware_version_fails_the_policy_probe_only() {
    // The system-status probe still yields exactly one version_info
    // observation even when the version string is not a parsable release.
    let mut responses = healthy_device("v6.4.1");
    responses.insert(
        "/api/v2/monitor/system/status".to_owned(),
        json!({"serial": "S/N", "version": "1234", "build": 1337}),
    );
    let (addr, _state) = start_device(responses, HashMap::new()).await;
    let snapshot = scrape(addr).await;

    let version_info = named(&snapshot, "fortigate_version_info");
    assert_eq!(version_info.len(), 1);
    assert_eq!(version_info[0].label_values, vec!["S/N", "1234", "1337"]);

    // The version-gated policy probe cannot pick an endpoint variant.
    assert!(!snapshot.success);
    assert!(named(&snapshot, "fortigate_policy_active_sessions").is_empty());
}

#[tokio::test]
async fn failing_endpoint_fails_only_its_probe() {
    let mut errors = HashMap::new();
    errors.insert("/api/v2/monitor/system/sensor-info".to_owned(), 500);
    let (addr, _state) = start_device(healthy_device("v6.4.1"), errors).await;
    let snapshot = scrape(addr).await;

    assert!(!snapshot.success, "one failed probe flips aggregate success");
    assert!(named(&snapshot, "fortigate_sensor_temperature_celsius").is_empty());
    assert!(named(&snapshot, "fortigate_sensor_alarm").is_empty());
    // Siblings are untouched.
    assert!(!named(&snapshot, "fortigate_interface_link_up").is_empty());
    assert!(!named(&snapshot, "fortigate_version_info").is_empty());
}

#[tokio::test]
async fn decode_mismatch_discards_the_whole_probe() {
    let mut responses = healthy_device("v6.4.1");
    responses.insert(
        "/api/v2/monitor/system/time".to_owned(),
        json!({"results": {"time": "not-a-number"}}),
    );
    let (addr, _state) = start_device(responses, HashMap::new()).await;
    let snapshot = scrape(addr).await;

    assert!(!snapshot.success);
    assert!(named(&snapshot, "fortigate_time_seconds").is_empty());
}

#[tokio::test]
async fn target_path_and_query_are_stripped() {
    let (addr, state) = start_device(healthy_device("v6.4.1"), HashMap::new()).await;
    let snapshot = scrape_url(&format!("http://{addr}/some/path?x=1"), addr).await;
    assert!(snapshot.success);

    let requests = state.requests.lock().unwrap();
    assert!(!requests.is_empty());
    assert!(
        requests.iter().all(|(path, _)| path.starts_with("/api/v2/")),
        "probe requests must not inherit the target's path"
    );
}

#[tokio::test]
async fn unknown_target_and_bad_scheme_abort_before_probing() {
    let (addr, state) = start_device(healthy_device("v6.4.1"), HashMap::new()).await;
    let auth = auth_for(addr);
    let http = reqwest::Client::new();

    let err = probe_target("http://other-host:9", &auth, &http)
        .await
        .unwrap_err();
    assert!(matches!(err, ScrapeError::UnknownTarget(_)));

    let err = probe_target(&format!("ftp://{addr}"), &auth, &http)
        .await
        .unwrap_err();
    assert!(matches!(err, ScrapeError::UnsupportedScheme(_)));

    assert!(
        state.requests.lock().unwrap().is_empty(),
        "fatal target errors must abort before any probe runs"
    );
}

#[tokio::test]
async fn rejected_credential_fails_every_probe_with_no_observations() {
    let (addr, _state) = start_device(healthy_device("v6.4.1"), HashMap::new()).await;
    let auth = AuthKeys::from_pairs(&[(&format!("http://{addr}"), "wrong-token")]);
    let snapshot = probe_target(&format!("http://{addr}"), &auth, &reqwest::Client::new())
        .await
        .unwrap();

    assert!(!snapshot.success);
    assert!(snapshot.observations.is_empty());
}
