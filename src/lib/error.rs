//! Error taxonomy for the exporter.
//!
//! Two scopes, kept deliberately separate:
//!
//! - [`ScrapeError`]: fatal before any probe runs (bad target URL, unknown
//!   device). Surfaced to the HTTP caller as a 4xx.
//! - [`ProbeError`]: scoped to a single probe routine. Caught at the probe
//!   boundary, logged, and converted into `success = false` with zero
//!   observations — sibling probes keep running.

use thiserror::Error;

/// Fatal errors raised while resolving a scrape target, before any probe runs.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("invalid target URL: {0}")]
    InvalidTarget(String),

    #[error("unsupported scheme {0:?}, only http and https are allowed")]
    UnsupportedScheme(String),

    /// The target has no entry in the auth-key file. Never falls back to a
    /// default credential.
    #[error("no API token configured for target {0}")]
    UnknownTarget(String),
}

/// Errors scoped to one probe routine.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Connect/TLS/timeout failure. The wrapped error has had its URL
    /// stripped so the target address and query never leak into logs.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The device answered with a non-200 status. Only the numeric status is
    /// carried.
    #[error("unexpected HTTP status {0}")]
    Http(u16),

    /// The response body did not match the shape this probe expects.
    #[error("failed to decode response: {0}")]
    Decode(#[source] reqwest::Error),

    /// The firmware version string could not be parsed, so a version-gated
    /// probe cannot pick an API variant.
    #[error("unparsable firmware version {0:?}")]
    Version(String),

    /// A required sub-structure was absent from an otherwise well-formed
    /// response.
    #[error("missing {0} in response")]
    Missing(&'static str),

    /// The composed request URL was invalid. API paths are a fixed,
    /// code-known catalog, so this indicates a programming error.
    #[error("invalid request URL for path {0:?}")]
    InvalidUrl(&'static str),
}

impl ProbeError {
    /// Wrap a reqwest transport error with its URL removed. The request URL
    /// is the one place a credential or target address could ride along, so
    /// it is dropped unconditionally.
    pub fn transport(err: reqwest::Error) -> Self {
        ProbeError::Transport(err.without_url())
    }

    /// Wrap a reqwest body/decode error, likewise sanitized.
    pub fn decode(err: reqwest::Error) -> Self {
        ProbeError::Decode(err.without_url())
    }
}
