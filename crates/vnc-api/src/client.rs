// Controller API HTTP client
//
// Wraps `reqwest::Client` with API-server URL construction, the
// `{"<resource-type>": {...}}` body envelope, fq_name → uuid resolution and
// status-code mapping. Resource endpoints (networks, IPAM) are implemented as
// inherent methods in separate files to keep this module focused on
// transport mechanics.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, trace};
use url::Url;
use uuid::Uuid;

use crate::error::Error;
use crate::resources::{FqName, ResourceRef};
use crate::transport::TransportConfig;

/// Error body shape returned by the API server alongside non-2xx statuses.
/// Older releases reply with plain text instead.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct FqNameToId {
    uuid: Uuid,
}

/// Raw HTTP client for the controller's configuration API server.
///
/// One HTTP round-trip per call. No retries, no caching.
#[derive(Debug)]
pub struct VncClient {
    http: reqwest::Client,
    base_url: Url,
    page_limit: Option<u32>,
}

impl VncClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client, injecting `X-Auth-Token` when a token is supplied.
    ///
    /// `base_url` is the API server root, e.g. `http://10.0.0.10:8082`.
    pub fn new(
        base_url: Url,
        token: Option<&SecretString>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            let mut value =
                HeaderValue::from_str(token.expose_secret()).map_err(|e| Error::Authentication {
                    message: format!("invalid token header value: {e}"),
                })?;
            value.set_sensitive(true);
            headers.insert("X-Auth-Token", value);
        }

        let http = transport.build_client_with_headers(headers)?;
        Ok(Self::with_client(http, base_url))
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            page_limit: None,
        }
    }

    /// Fetch collections in pages of at most `limit` entries.
    pub fn with_page_limit(mut self, limit: Option<u32>) -> Self {
        self.page_limit = limit.filter(|l| *l > 0);
        self
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"virtual-networks"`) onto the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        handle_response(resp, path).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        handle_response(resp, path).await
    }

    pub(crate) async fn put<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        handle_empty(resp, path).await
    }

    // ── Collections ──────────────────────────────────────────────────

    /// List every entry of a collection (e.g. `"virtual-networks"`).
    ///
    /// With a page limit configured, follows `page_marker` until the server
    /// stops returning a marker. Entries keep server order across pages.
    pub async fn list_all(&self, collection: &str) -> Result<Vec<ResourceRef>, Error> {
        let mut entries = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let mut params = Vec::new();
            if let Some(limit) = self.page_limit {
                params.push(("page_limit", limit.to_string()));
                if let Some(ref m) = marker {
                    params.push(("page_marker", m.clone()));
                }
            }

            let mut page: serde_json::Map<String, serde_json::Value> =
                self.get(collection, &params).await?;
            let items: Vec<ResourceRef> = match page.remove(collection) {
                Some(value) => serde_json::from_value(value).map_err(|e| Error::Deserialization {
                    message: format!("malformed {collection} listing: {e}"),
                    body: String::new(),
                })?,
                None => Vec::new(),
            };
            let next = page
                .remove("marker")
                .and_then(|m| m.as_str().map(String::from));

            trace!(collection, count = items.len(), ?next, "listing page");
            let exhausted = items.is_empty();
            entries.extend(items);

            match next {
                Some(next)
                    if self.page_limit.is_some() && !exhausted && marker.as_ref() != Some(&next) =>
                {
                    marker = Some(next);
                }
                _ => break,
            }
        }

        debug!(collection, total = entries.len(), "listing complete");
        Ok(entries)
    }

    // ── Name resolution ──────────────────────────────────────────────

    /// Resolve a fully-qualified name to the resource's uuid.
    ///
    /// `POST /fqname-to-id` with `{"type": ..., "fq_name": [...]}`
    pub async fn fq_name_to_id(&self, resource_type: &str, fq_name: &FqName) -> Result<Uuid, Error> {
        let body = json!({ "type": resource_type, "fq_name": fq_name });
        match self.post::<FqNameToId, _>("fqname-to-id", &body).await {
            Ok(found) => Ok(found.uuid),
            Err(e) if e.is_not_found() => Err(Error::NotFound {
                resource_type: resource_type.to_owned(),
                identifier: fq_name.to_string(),
            }),
            Err(e) => Err(e),
        }
    }
}

// ── Response handling ────────────────────────────────────────────────

async fn handle_response<T: DeserializeOwned>(
    resp: reqwest::Response,
    path: &str,
) -> Result<T, Error> {
    let status = resp.status();
    let body = resp.text().await?;
    trace!(%status, len = body.len(), "response received");

    if !status.is_success() {
        return Err(status_error(status, path, &body));
    }

    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.clone(),
        }
    })
}

/// Check the status and discard the body (PUT replies vary across releases).
async fn handle_empty(resp: reqwest::Response, path: &str) -> Result<(), Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    let body = resp.text().await.unwrap_or_default();
    Err(status_error(status, path, &body))
}

/// Map a non-success status to a typed error.
fn status_error(status: reqwest::StatusCode, path: &str, body: &str) -> Error {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .unwrap_or_else(|| body.chars().take(200).collect());

    match status {
        reqwest::StatusCode::UNAUTHORIZED => Error::Authentication {
            message: if message.is_empty() {
                "token rejected or expired".into()
            } else {
                message
            },
        },
        // Endpoint wrappers re-key this with the concrete resource type.
        reqwest::StatusCode::NOT_FOUND => Error::NotFound {
            resource_type: "resource".into(),
            identifier: path.to_owned(),
        },
        reqwest::StatusCode::CONFLICT => Error::Conflict { message },
        _ => Error::Api {
            status: status.as_u16(),
            message,
        },
    }
}
