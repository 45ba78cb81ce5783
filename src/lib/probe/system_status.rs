//! System status probe: serial, firmware version, and build as an info
//! gauge.

use serde::Deserialize;

use crate::client::FortiClient;
use crate::error::ProbeError;
use crate::metrics::{MetricDesc, Observation};

static VERSION_INFO: MetricDesc = MetricDesc::gauge(
    "fortigate_version_info",
    "System version and build information.",
    &["serial", "version", "build"],
);

/// `system/status` answers with these fields at the top level, not inside a
/// results envelope.
#[derive(Debug, Deserialize)]
struct SystemStatus {
    serial: String,
    version: String,
    build: i64,
}

pub(super) async fn probe(client: &FortiClient) -> Result<Vec<Observation>, ProbeError> {
    let status: SystemStatus = client.get("api/v2/monitor/system/status", "").await?;
    Ok(vec![VERSION_INFO.observe(
        &[
            status.serial.as_str(),
            status.version.as_str(),
            &status.build.to_string(),
        ],
        1.0,
    )])
}
