//! Exporter configuration: CLI flags and the per-target auth-key file.
//!
//! Flags cover the process-level knobs (listen address, timeouts, TLS
//! trust); the auth-key file maps each scrape target to its API token and is
//! loaded once at startup, immutable afterwards.

use clap::Parser;
use ext_config::{Config, ConfigError, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::probe::normalize_target;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "fortigate-exporter",
    about = "Prometheus exporter for FortiGate appliances via the REST monitoring API"
)]
pub struct ExporterConfig {
    /// Address the HTTP server binds to.
    #[arg(long, default_value = "0.0.0.0:9710")]
    pub listen_address: SocketAddr,

    /// Path to the TOML file mapping targets to API tokens.
    #[arg(long, default_value = "fortigate-keys.toml")]
    pub auth_file: PathBuf,

    /// Upper bound for one whole scrape, in seconds. Also applied to every
    /// device-facing request so in-flight calls abort with the scrape.
    #[arg(long, default_value_t = 30)]
    pub scrape_timeout_secs: u64,

    /// Accept invalid TLS certificates from devices. Most appliances ship
    /// self-signed certs, so this is commonly needed.
    #[arg(long)]
    pub insecure: bool,

    /// Additional trusted CA certificate in PEM format.
    #[arg(long)]
    pub tls_ca_cert: Option<PathBuf>,
}

impl ExporterConfig {
    pub fn scrape_timeout(&self) -> Duration {
        Duration::from_secs(self.scrape_timeout_secs)
    }

    /// Build the shared device-facing HTTP transport. Created once at
    /// startup; its connection pool and TLS session cache are reused across
    /// scrapes.
    pub fn build_http_client(&self) -> anyhow::Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.scrape_timeout())
            .danger_accept_invalid_certs(self.insecure);
        if let Some(path) = &self.tls_ca_cert {
            let pem = std::fs::read(path)?;
            builder = builder.add_root_certificate(reqwest::Certificate::from_pem(&pem)?);
        }
        Ok(builder.build()?)
    }
}

/// One `[[targets]]` entry in the auth-key file.
#[derive(Debug, Deserialize)]
struct TargetAuth {
    url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct AuthFile {
    targets: Vec<TargetAuth>,
}

/// Process-wide read-only map from normalized target to API token.
///
/// A target with no entry is an error at scrape time, never a default
/// credential.
#[derive(Debug, Default)]
pub struct AuthKeys {
    tokens: HashMap<String, String>,
}

impl AuthKeys {
    /// Load and normalize the auth-key file:
    ///
    /// ```toml
    /// [[targets]]
    /// url = "https://fw.example.com"
    /// token = "secret"
    /// ```
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file: AuthFile = Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?;

        let mut tokens = HashMap::with_capacity(file.targets.len());
        for entry in file.targets {
            let target = normalize_target(&entry.url)
                .map_err(|e| ConfigError::Message(format!("bad target in auth file: {e}")))?;
            tokens.insert(target, entry.token);
        }
        Ok(Self { tokens })
    }

    /// Look up the token for a normalized target.
    pub fn token_for(&self, target: &str) -> Option<&str> {
        self.tokens.get(target).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Build a key map directly from `(target, token)` pairs. The file
    /// format is only one way to populate the map; embedders and tests can
    /// construct it programmatically.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            tokens: pairs
                .iter()
                .map(|(t, k)| (t.to_string(), k.to_string()))
                .collect(),
        }
    }
}
