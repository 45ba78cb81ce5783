//! Certificate probe: identity and validity window of every certificate
//! known to the device, including remote, CA, and CRL entries.

use serde::Deserialize;

use super::Envelope;
use crate::client::FortiClient;
use crate::error::ProbeError;
use crate::metrics::{MetricDesc, Observation};

static CERT_INFO: MetricDesc = MetricDesc::gauge(
    "fortigate_certificate_info",
    "Identity of a certificate installed on the device.",
    &["name", "source", "status", "type"],
);
static CERT_VALID_FROM: MetricDesc = MetricDesc::gauge(
    "fortigate_certificate_valid_from_seconds",
    "Unix timestamp from which the certificate is valid.",
    &["name", "source"],
);
static CERT_VALID_TO: MetricDesc = MetricDesc::gauge(
    "fortigate_certificate_valid_to_seconds",
    "Unix timestamp until which the certificate is valid.",
    &["name", "source"],
);

#[derive(Debug, Deserialize)]
struct Certificate {
    name: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    status: String,
    #[serde(rename = "type", default)]
    cert_type: String,
    valid_from: f64,
    valid_to: f64,
}

pub(super) async fn probe(client: &FortiClient) -> Result<Vec<Observation>, ProbeError> {
    let certs: Envelope<Vec<Certificate>> = client
        .get(
            "api/v2/monitor/system/available-certificates",
            "scope=global&with_remote=1&with_ca=1&with_crl=1",
        )
        .await?;

    let mut observations = Vec::new();
    for cert in &certs.results {
        observations.push(CERT_INFO.observe(
            &[
                cert.name.as_str(),
                cert.source.as_str(),
                cert.status.as_str(),
                cert.cert_type.as_str(),
            ],
            1.0,
        ));
        let identity = [cert.name.as_str(), cert.source.as_str()];
        observations.push(CERT_VALID_FROM.observe(&identity, cert.valid_from));
        observations.push(CERT_VALID_TO.observe(&identity, cert.valid_to));
    }
    Ok(observations)
}
