//! Authenticated HTTP client for one FortiGate target.
//!
//! Built per scrape from the normalized target URL and its API token, and
//! dropped when the scrape ends. The underlying `reqwest::Client` (connection
//! pool, TLS session cache) is shared across scrapes and passed in by the
//! caller.

use reqwest::header::AUTHORIZATION;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::ProbeError;

/// Read-only client for the REST monitoring API of a single appliance.
pub struct FortiClient {
    base: Url,
    token: String,
    http: reqwest::Client,
}

impl FortiClient {
    pub fn new(base: Url, token: String, http: reqwest::Client) -> Self {
        Self { base, token, http }
    }

    /// Issue an authenticated GET against a fixed API path with a
    /// pre-encoded query string, decoding the JSON body into `T`.
    ///
    /// The token travels in the `Authorization` header rather than as a URL
    /// parameter, so it cannot surface in request logs on the device side.
    /// Transport errors come back with the URL stripped; a non-200 status is
    /// reported as the numeric status alone.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &'static str,
        query: &str,
    ) -> Result<T, ProbeError> {
        let mut url = self
            .base
            .join(path)
            .map_err(|_| ProbeError::InvalidUrl(path))?;
        if !query.is_empty() {
            url.set_query(Some(query));
        }

        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .send()
            .await
            .map_err(ProbeError::transport)?;

        if response.status() != StatusCode::OK {
            return Err(ProbeError::Http(response.status().as_u16()));
        }

        response.json::<T>().await.map_err(ProbeError::decode)
    }
}
