//! Identity provider sign-in through the backend's auth API

use crate::backend::BackendClient;
use crate::error::{Result, ResumeStudioError};
use crate::storage::LocalStore;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use url::Url;

/// Local storage key for the persisted session
pub const SESSION_KEY: &str = "auth-session";

/// Refresh this many seconds before the token actually expires
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Map<String, Value>,
}

impl User {
    fn metadata_str(&self, key: &str) -> Option<&str> {
        self.user_metadata
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Best display name the provider gave us
    pub fn full_name(&self) -> Option<String> {
        if let Some(name) = self.metadata_str("full_name").or_else(|| self.metadata_str("name")) {
            return Some(name.to_string());
        }
        match (self.metadata_str("given_name"), self.metadata_str("family_name")) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            (Some(first), None) => Some(first.to_string()),
            (None, Some(last)) => Some(last.to_string()),
            (None, None) => None,
        }
    }

    pub fn given_name(&self) -> Option<&str> {
        self.metadata_str("given_name")
    }

    pub fn family_name(&self) -> Option<&str> {
        self.metadata_str("family_name")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Unix seconds
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: User,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now.timestamp() + EXPIRY_MARGIN_SECS >= expires_at,
            None => false,
        }
    }
}

/// Session changes published by the auth client
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    InitialSession(Option<Session>),
    SignedIn(Session),
    TokenRefreshed(Session),
    SignedOut,
}

/// Tokens carried in the OAuth redirect
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: Option<i64>,
    pub expires_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default = "default_token_type")]
    token_type: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: User,
}

pub struct AuthClient {
    backend: BackendClient,
    store: LocalStore,
    provider: String,
    redirect_url: String,
    events: broadcast::Sender<AuthEvent>,
}

impl AuthClient {
    pub fn new(
        backend: BackendClient,
        store: LocalStore,
        provider: impl Into<String>,
        redirect_url: impl Into<String>,
    ) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            backend,
            store,
            provider: provider.into(),
            redirect_url: redirect_url.into(),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: AuthEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// The URL the user opens in a browser to start the provider flow
    pub fn authorize_url(&self) -> Result<Url> {
        let mut url = self.backend.endpoint("auth/v1/authorize")?;
        url.query_pairs_mut()
            .append_pair("provider", &self.provider)
            .append_pair("redirect_to", &self.redirect_url);
        Ok(url)
    }

    /// Finish sign-in from the URL the provider redirected to
    pub async fn sign_in_with_callback(&self, callback_url: &str) -> Result<Session> {
        let tokens = parse_callback(callback_url)?;
        let user = self.fetch_user(&tokens.access_token).await?;

        let expires_at = tokens
            .expires_at
            .or_else(|| tokens.expires_in.map(|secs| Utc::now().timestamp() + secs));

        let session = Session {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: tokens.token_type,
            expires_at,
            user,
        };

        self.store.set(SESSION_KEY, &session)?;
        info!("Signed in as {}", session.user.email.as_deref().unwrap_or(&session.user.id));
        self.emit(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    pub async fn fetch_user(&self, access_token: &str) -> Result<User> {
        let url = self.backend.endpoint("auth/v1/user")?;
        let client = self.backend.clone().with_access_token(access_token);
        let response = client
            .send(client.request(Method::GET, url))
            .await
            .map_err(auth_error)?;
        Ok(response.json().await?)
    }

    /// Load the persisted session, refreshing it when expired, and announce the result
    pub async fn restore_session(&self) -> Result<Option<Session>> {
        let stored: Option<Session> = self.store.get(SESSION_KEY)?;

        let session = match stored {
            Some(session) if session.is_expired(Utc::now()) => {
                debug!("Stored session expired, refreshing");
                match self.refresh_session(&session.refresh_token).await {
                    Ok(refreshed) => Some(refreshed),
                    Err(e) => {
                        warn!("Session refresh failed, signing out locally: {}", e);
                        self.store.remove(SESSION_KEY)?;
                        None
                    }
                }
            }
            other => other,
        };

        self.emit(AuthEvent::InitialSession(session.clone()));
        Ok(session)
    }

    pub async fn refresh_session(&self, refresh_token: &str) -> Result<Session> {
        let mut url = self.backend.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "refresh_token");

        let request = self
            .backend
            .request(Method::POST, url)
            .json(&serde_json::json!({ "refresh_token": refresh_token }));
        let response = self.backend.send(request).await.map_err(auth_error)?;
        let token: TokenResponse = response.json().await?;

        let expires_at = token
            .expires_at
            .or_else(|| token.expires_in.map(|secs| Utc::now().timestamp() + secs));
        let session = Session {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            token_type: token.token_type,
            expires_at,
            user: token.user,
        };

        self.store.set(SESSION_KEY, &session)?;
        self.emit(AuthEvent::TokenRefreshed(session.clone()));
        Ok(session)
    }

    /// Revoke remotely when possible; the local session is always cleared
    pub async fn sign_out(&self) -> Result<()> {
        if let Some(session) = self.store.get::<Session>(SESSION_KEY)? {
            let url = self.backend.endpoint("auth/v1/logout")?;
            let client = self.backend.clone().with_access_token(&session.access_token);
            if let Err(e) = client.send(client.request(Method::POST, url)).await {
                warn!("Remote sign-out failed: {}", e);
            }
        }

        self.store.remove(SESSION_KEY)?;
        self.emit(AuthEvent::SignedOut);
        Ok(())
    }

    pub fn current_session(&self) -> Result<Option<Session>> {
        self.store.get(SESSION_KEY)
    }
}

fn auth_error(err: ResumeStudioError) -> ResumeStudioError {
    match err {
        ResumeStudioError::Backend { status, message } if status == 401 || status == 403 => {
            ResumeStudioError::Auth(message)
        }
        other => other,
    }
}

/// Read tokens from the redirect URL fragment (or query, for providers that use it)
pub fn parse_callback(callback_url: &str) -> Result<CallbackTokens> {
    let url = Url::parse(callback_url)
        .map_err(|e| ResumeStudioError::Auth(format!("Invalid callback URL: {}", e)))?;

    let raw = url
        .fragment()
        .filter(|f| !f.is_empty())
        .or_else(|| url.query())
        .unwrap_or_default();

    let params: Map<String, Value> = url::form_urlencoded::parse(raw.as_bytes())
        .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
        .collect();
    let param = |key: &str| params.get(key).and_then(|v| v.as_str()).map(str::to_string);

    if let Some(description) = param("error_description").or_else(|| param("error")) {
        return Err(ResumeStudioError::Auth(description));
    }

    let access_token = param("access_token")
        .ok_or_else(|| ResumeStudioError::Auth("Callback URL has no access_token".to_string()))?;
    let refresh_token = param("refresh_token")
        .ok_or_else(|| ResumeStudioError::Auth("Callback URL has no refresh_token".to_string()))?;

    Ok(CallbackTokens {
        access_token,
        refresh_token,
        token_type: param("token_type").unwrap_or_else(default_token_type),
        expires_in: param("expires_in").and_then(|v| v.parse().ok()),
        expires_at: param("expires_at").and_then(|v| v.parse().ok()),
    })
}
