//! Shared HTTP plumbing for the managed backend platform

use crate::config::BackendConfig;
use crate::error::{Result, ResumeStudioError};
use log::debug;
use reqwest::{Client, Method, RequestBuilder, Response};
use url::Url;

/// HTTP client for the backend's REST surface (`/auth/v1`, `/rest/v1`, `/storage/v1`).
///
/// Every request carries the project's anon key as `apikey`. The bearer token is the
/// signed-in user's access token when one is set, otherwise the anon key.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: Url,
    anon_key: String,
    access_token: Option<String>,
}

impl BackendClient {
    pub fn new(base_url: &str, anon_key: impl Into<String>) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        // Url::join replaces the last segment unless the path ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http: Client::new(),
            base_url,
            anon_key: anon_key.into(),
            access_token: None,
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        Self::new(&config.url, config.anon_key.clone())
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Resolve a path such as `rest/v1/resumes` against the project URL
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    /// Send and turn any non-2xx status into `ResumeStudioError::Backend`
    pub async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        debug!("Backend responded {} for {}", status.as_u16(), response.url().path());

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ResumeStudioError::Backend {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }
}

/// Pull a readable message out of an auth, PostgREST, or storage error body
pub fn error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    if let Some(value) = parsed {
        for key in ["message", "error_description", "msg", "error"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                if !text.is_empty() {
                    return text.to_string();
                }
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "request failed".to_string()
    } else {
        trimmed.to_string()
    }
}
