// ── Session bootstrap ──
//
// Turns a `ControllerConfig` into a ready `VncClient`: builds the transport,
// obtains a token when Keystone credentials are configured, and applies the
// listing page size.

use secrecy::SecretString;
use tracing::debug;
use vnc_api::{KeystoneCredentials, TlsMode, TransportConfig, VncClient};

use crate::config::{AuthCredentials, ControllerConfig, TlsVerification};
use crate::error::CoreError;

/// Build the transport config the API client and token exchange share.
pub fn transport_config(config: &ControllerConfig) -> TransportConfig {
    let tls = match &config.tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    };
    TransportConfig {
        tls,
        timeout: config.timeout,
    }
}

/// Authenticate (if required) and return a client for the API server.
pub async fn connect(config: &ControllerConfig) -> Result<VncClient, CoreError> {
    let transport = transport_config(config);

    let token: Option<SecretString> = match &config.auth {
        AuthCredentials::None => None,
        AuthCredentials::Token(token) => Some(token.clone()),
        AuthCredentials::Keystone {
            auth_url,
            username,
            password,
            tenant,
            domain,
        } => {
            let creds = KeystoneCredentials {
                auth_url: auth_url.clone(),
                username: username.clone(),
                password: password.clone(),
                tenant: tenant.clone(),
                domain: domain.clone(),
            };
            Some(creds.request_token(&transport).await?)
        }
    };

    debug!(url = %config.url, authenticated = token.is_some(), "controller session ready");

    let client = VncClient::new(config.url.clone(), token.as_ref(), &transport)?
        .with_page_limit(config.page_limit);
    Ok(client)
}
