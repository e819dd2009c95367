//! Profile configuration for `vncctl`.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation to `vnc_core::ControllerConfig`. The CLI layers its
//! `GlobalOpts` overrides on top of what this crate resolves.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vnc_core::{AuthCredentials, ControllerConfig, TlsVerification};

/// Service name under which secrets are stored in the system keyring.
pub const KEYRING_SERVICE: &str = "vncctl";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named API server profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Listing page size; unset fetches collections in one request.
    #[serde(default)]
    pub page_limit: Option<u32>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: default_timeout(),
            page_limit: None,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named API server profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// API server base URL (e.g., "http://10.0.0.10:8082").
    pub api_server: String,

    /// Auth mode: "none", "token", or "keystone".
    #[serde(default = "default_auth_mode")]
    pub auth_mode: String,

    /// Keystone identity endpoint including the version (e.g., "http://10.0.0.10:5000/v3").
    pub auth_url: Option<String>,

    /// Keystone username.
    pub username: Option<String>,

    /// Keystone password (plaintext, prefer keyring).
    pub password: Option<String>,

    /// Pre-issued token (plaintext, prefer keyring or env var).
    pub token: Option<String>,

    /// Environment variable name containing the token.
    pub token_env: Option<String>,

    /// Project the Keystone token is scoped to.
    pub tenant: Option<String>,

    /// Keystone domain of the user and tenant.
    pub user_domain: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Override listing page size.
    pub page_limit: Option<u32>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            api_server: String::new(),
            auth_mode: default_auth_mode(),
            auth_url: None,
            username: None,
            password: None,
            token: None,
            token_env: None,
            tenant: None,
            user_domain: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
            page_limit: None,
        }
    }
}

fn default_auth_mode() -> String {
    "none".into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "vncctl", "vncctl").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("vncctl");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
///
/// Environment keys nest on a double underscore, e.g.
/// `VNC_DEFAULTS__OUTPUT=json` or `VNC_DEFAULT_PROFILE=lab`.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from an explicit file path (plus environment).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("VNC_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Keyring account for a profile secret (`"token"` or `"password"`).
pub fn keyring_account(profile_name: &str, kind: &str) -> String {
    format!("{profile_name}/{kind}")
}

fn keyring_secret(profile_name: &str, kind: &str) -> Option<SecretString> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_account(profile_name, kind)).ok()?;
    entry.get_password().ok().map(SecretString::from)
}

/// Resolve a pre-issued token from the credential chain (no CLI flag step).
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's token_env → env var lookup
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Some(secret) = keyring_secret(profile_name, "token") {
        return Ok(secret);
    }

    // 3. Plaintext in config
    if let Some(ref token) = profile.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Resolve Keystone username + password without CLI flags.
pub fn resolve_keystone_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<(String, SecretString), ConfigError> {
    let username = profile
        .username
        .clone()
        .or_else(|| std::env::var("VNC_USERNAME").ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;

    // 1. Env var
    if let Ok(pw) = std::env::var("VNC_PASSWORD") {
        return Ok((username, SecretString::from(pw)));
    }

    // 2. Keyring
    if let Some(pw) = keyring_secret(profile_name, "password") {
        return Ok((username, pw));
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok((username, SecretString::from(pw.clone())));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Resolve `AuthCredentials` from a profile's `auth_mode` field.
pub fn resolve_auth(profile: &Profile, profile_name: &str) -> Result<AuthCredentials, ConfigError> {
    match profile.auth_mode.as_str() {
        "none" => Ok(AuthCredentials::None),
        "token" => Ok(AuthCredentials::Token(resolve_token(profile, profile_name)?)),
        "keystone" => {
            let raw = profile
                .auth_url
                .as_deref()
                .ok_or_else(|| ConfigError::Validation {
                    field: "auth_url".into(),
                    reason: "required when auth_mode is 'keystone'".into(),
                })?;
            let auth_url = parse_url("auth_url", raw)?;
            let (username, password) = resolve_keystone_credentials(profile, profile_name)?;
            Ok(AuthCredentials::Keystone {
                auth_url,
                username,
                password,
                tenant: profile.tenant.clone().unwrap_or_else(|| "admin".into()),
                domain: profile
                    .user_domain
                    .clone()
                    .unwrap_or_else(|| "Default".into()),
            })
        }
        other => Err(ConfigError::Validation {
            field: "auth_mode".into(),
            reason: format!("expected 'none', 'token', or 'keystone', got '{other}'"),
        }),
    }
}

fn parse_url(field: &str, raw: &str) -> Result<url::Url, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL: {raw}"),
    })
}

/// TLS strategy for a profile: `insecure` wins over `ca_cert`.
pub fn profile_tls(profile: &Profile, defaults: &Defaults) -> TlsVerification {
    if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    }
}

/// Build a `ControllerConfig` from a profile, no CLI flag overrides.
pub fn profile_to_controller_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ControllerConfig, ConfigError> {
    let url = parse_url("api_server", &profile.api_server)?;
    let auth = resolve_auth(profile, profile_name)?;

    Ok(ControllerConfig {
        url,
        auth,
        tls: profile_tls(profile, defaults),
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        page_limit: profile.page_limit.or(defaults.page_limit),
    })
}
