//! HTTP gateway core: base resolution, bearer injection, error mapping
//!
//! The backend publishes three endpoint groups behind distinct base
//! URLs. Dispatch is by path prefix: `auth/` goes to the auth base
//! with the prefix kept on the wire, `admin/` goes to the admin base
//! with the prefix stripped, absolute URLs pass through untouched and
//! everything else goes to the default app base.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::BackendConfig;
use crate::session::store::SessionStore;
use crate::shared::errors::{ApiError, ApiResult};

pub struct ApiClient {
    http: reqwest::Client,
    auth_base: String,
    app_base: String,
    admin_base: String,
    store: Arc<dyn SessionStore>,
}

impl ApiClient {
    pub fn new(config: &BackendConfig, store: Arc<dyn SessionStore>) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            http,
            auth_base: config.auth_base_url.trim_end_matches('/').to_string(),
            app_base: config.app_base_url.trim_end_matches('/').to_string(),
            admin_base: config.admin_base_url.trim_end_matches('/').to_string(),
            store,
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = self.resolve_url(path)?;
        self.execute(self.http.get(url), "GET", path).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.resolve_url(path)?;
        self.execute(self.http.post(url).json(body), "POST", path).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        method: &str,
        path: &str,
    ) -> ApiResult<T> {
        let request = match self.bearer().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        debug!(method, path, status, "backend call");

        if !(200..300).contains(&status) {
            return Err(ApiError::Status {
                status,
                message: extract_error_message(status, &text),
            });
        }
        if text.trim().is_empty() {
            // Some command endpoints answer 200 with no body.
            return serde_json::from_value(Value::Null).map_err(|e| ApiError::Decode(e.to_string()));
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Cache read failures degrade to an anonymous request, same as a
    /// missing token.
    async fn bearer(&self) -> Option<String> {
        self.store.token().await.ok().flatten()
    }

    fn resolve_url(&self, path: &str) -> ApiResult<Url> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Url::parse(path).map_err(|e| ApiError::InvalidUrl(format!("{path}: {e}")));
        }
        let p = path.trim_start_matches('/');
        let joined = if p.starts_with("auth/") {
            format!("{}/{}", self.auth_base, p)
        } else if let Some(rest) = p.strip_prefix("admin/") {
            format!("{}/{}", self.admin_base, rest.trim_start_matches('/'))
        } else {
            format!("{}/{}", self.app_base, p)
        };
        Url::parse(&joined).map_err(|e| ApiError::InvalidUrl(format!("{joined}: {e}")))
    }
}

/// User-visible message for a non-2xx response: `message` or `error`
/// from a JSON object body, then the raw body text, then a generic
/// `HTTP <status>`.
fn extract_error_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(obj) = value.as_object() {
            for key in ["message", "error"] {
                if let Some(s) = obj.get(key).and_then(Value::as_str) {
                    if !s.trim().is_empty() {
                        return s.to_string();
                    }
                }
            }
        } else if let Some(s) = value.as_str() {
            if !s.trim().is_empty() {
                return s.to_string();
            }
        }
    }
    let raw = body.trim();
    if !raw.is_empty() {
        return raw.to_string();
    }
    format!("HTTP {status}")
}

// ── Tests ──────────────────────────────────────────────────────
