// Keystone v3 token exchange
//
// The API server accepts an `X-Auth-Token` issued by Keystone. The token is
// requested once per session with password credentials scoped to a project
// (tenant) and returned in the `X-Subject-Token` response header.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Password credentials for a project-scoped Keystone v3 token.
#[derive(Debug, Clone)]
pub struct KeystoneCredentials {
    /// Identity endpoint including the version, e.g. `http://10.0.0.10:5000/v3`.
    pub auth_url: Url,
    pub username: String,
    pub password: SecretString,
    /// Project the token is scoped to.
    pub tenant: String,
    /// Domain of both user and project (`Default` on most deployments).
    pub domain: String,
}

impl KeystoneCredentials {
    /// Request a token.
    ///
    /// `POST {auth_url}/auth/tokens`. Any non-2xx reply or a missing
    /// `X-Subject-Token` header is an [`Error::Authentication`].
    pub async fn request_token(&self, transport: &TransportConfig) -> Result<SecretString, Error> {
        let base = self.auth_url.as_str().trim_end_matches('/');
        let url = Url::parse(&format!("{base}/auth/tokens"))?;
        debug!(%url, user = %self.username, tenant = %self.tenant, "requesting keystone token");

        let body = json!({
            "auth": {
                "identity": {
                    "methods": ["password"],
                    "password": {
                        "user": {
                            "name": self.username,
                            "domain": { "name": self.domain },
                            "password": self.password.expose_secret(),
                        }
                    }
                },
                "scope": {
                    "project": {
                        "name": self.tenant,
                        "domain": { "name": self.domain },
                    }
                }
            }
        });

        let http = transport.build_client()?;
        let resp = http.post(url).json(&body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("token request failed (HTTP {status}): {body}"),
            });
        }

        let token = resp
            .headers()
            .get("X-Subject-Token")
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .ok_or_else(|| Error::Authentication {
                message: "identity service returned no X-Subject-Token header".into(),
            })?;

        debug!("keystone token issued");
        Ok(SecretString::from(token))
    }
}
