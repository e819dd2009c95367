// ── Runtime connection configuration ──
//
// These types describe *how* to reach an API server. They carry credential
// data and connection tuning, but never touch disk. The CLI constructs a
// `ControllerConfig` and hands it to `session::connect`.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// How to authenticate with the API server.
#[derive(Debug, Clone)]
pub enum AuthCredentials {
    /// API server running with `auth = noauth` (lab setups).
    None,
    /// Pre-issued Keystone token.
    Token(SecretString),
    /// Keystone v3 password auth, exchanged for a token on connect.
    Keystone {
        auth_url: Url,
        username: String,
        password: SecretString,
        tenant: String,
        domain: String,
    },
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Configuration for connecting to a single API server.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// API server URL (e.g., `http://10.0.0.10:8082`).
    pub url: Url,
    /// Authentication method and credentials.
    pub auth: AuthCredentials,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// Page size for collection listings. `None` fetches in one request.
    pub page_limit: Option<u32>,
}
