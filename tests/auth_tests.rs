//! Sign-in, session restore, and current-user state

use chrono::Utc;
use resume_studio::auth::client::SESSION_KEY;
use resume_studio::auth::{AuthClient, AuthEvent, Session, SessionHolder, User};
use resume_studio::backend::{BackendClient, Profile, ProfileStore};
use resume_studio::error::{Result, ResumeStudioError};
use resume_studio::storage::LocalStore;
use serde_json::{json, Map};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CALLBACK: &str =
    "http://localhost:3000/auth/callback#access_token=tok-1&refresh_token=ref-1&expires_in=3600&token_type=bearer";

fn setup(server: &MockServer) -> (TempDir, LocalStore, AuthClient) {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path().join("local-storage.json"));
    let backend = BackendClient::new(&server.uri(), "anon-key").unwrap();
    let auth = AuthClient::new(backend, store.clone(), "google", "http://localhost:3000/auth/callback");
    (dir, store, auth)
}

fn user_json() -> serde_json::Value {
    json!({
        "id": "u1",
        "email": "ada@example.com",
        "user_metadata": {"full_name": "Ada Lovelace"}
    })
}

fn session(expires_at: i64) -> Session {
    Session {
        access_token: "old-token".to_string(),
        refresh_token: "old-refresh".to_string(),
        token_type: "bearer".to_string(),
        expires_at: Some(expires_at),
        user: User {
            id: "u1".to_string(),
            email: Some("ada@example.com".to_string()),
            user_metadata: Map::new(),
        },
    }
}

/// Records upserts; optionally fails every call
#[derive(Clone, Default)]
struct RecordingProfiles {
    fail: bool,
    upserts: Arc<Mutex<Vec<Profile>>>,
}

impl ProfileStore for RecordingProfiles {
    async fn upsert_profile(&self, profile: &Profile, _access_token: &str) -> Result<()> {
        self.upserts.lock().unwrap().push(profile.clone());
        if self.fail {
            return Err(ResumeStudioError::Backend {
                status: 500,
                message: "profiles table unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_authorize_url_names_provider_and_redirect() {
    let server = MockServer::start().await;
    let (_dir, _store, auth) = setup(&server);

    let url = auth.authorize_url().unwrap();
    assert_eq!(url.path(), "/auth/v1/authorize");
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    assert!(pairs.contains(&("provider".to_string(), "google".to_string())));
    assert!(pairs.contains(&("redirect_to".to_string(), "http://localhost:3000/auth/callback".to_string())));
}

#[tokio::test]
async fn test_sign_in_persists_session_and_announces_it() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("Authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(1)
        .mount(&server)
        .await;

    let (_dir, store, auth) = setup(&server);
    let mut events = auth.subscribe();

    let session = auth.sign_in_with_callback(CALLBACK).await.unwrap();
    assert_eq!(session.user.id, "u1");
    assert_eq!(session.user.full_name().as_deref(), Some("Ada Lovelace"));
    assert!(session.expires_at.is_some());

    let stored: Session = store.get(SESSION_KEY).unwrap().unwrap();
    assert_eq!(stored, session);
    assert_eq!(events.try_recv().unwrap(), AuthEvent::SignedIn(session));
}

#[tokio::test]
async fn test_provider_error_in_callback_is_auth_error() {
    let server = MockServer::start().await;
    let (_dir, store, auth) = setup(&server);

    let err = auth
        .sign_in_with_callback("http://localhost:3000/auth/callback#error=access_denied&error_description=User+cancelled")
        .await
        .unwrap_err();

    match err {
        ResumeStudioError::Auth(message) => assert_eq!(message, "User cancelled"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!store.contains(SESSION_KEY).unwrap());
}

#[tokio::test]
async fn test_restore_refreshes_expired_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "refresh_token"))
        .and(body_partial_json(json!({"refresh_token": "old-refresh"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new-token",
            "refresh_token": "new-refresh",
            "token_type": "bearer",
            "expires_in": 3600,
            "user": user_json()
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (_dir, store, auth) = setup(&server);
    store.set(SESSION_KEY, &session(Utc::now().timestamp() - 10)).unwrap();

    let restored = auth.restore_session().await.unwrap().unwrap();
    assert_eq!(restored.access_token, "new-token");

    let stored: Session = store.get(SESSION_KEY).unwrap().unwrap();
    assert_eq!(stored.refresh_token, "new-refresh");
}

#[tokio::test]
async fn test_restore_without_session_announces_none() {
    let server = MockServer::start().await;
    let (_dir, _store, auth) = setup(&server);
    let mut events = auth.subscribe();

    assert!(auth.restore_session().await.unwrap().is_none());
    assert_eq!(events.try_recv().unwrap(), AuthEvent::InitialSession(None));
}

#[tokio::test]
async fn test_sign_out_clears_session_even_when_remote_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let (_dir, store, auth) = setup(&server);
    store.set(SESSION_KEY, &session(Utc::now().timestamp() + 3600)).unwrap();
    let mut events = auth.subscribe();

    auth.sign_out().await.unwrap();

    assert!(auth.current_session().unwrap().is_none());
    assert_eq!(events.try_recv().unwrap(), AuthEvent::SignedOut);
}

#[tokio::test]
async fn test_session_holder_starts_loading() {
    let holder = SessionHolder::new(RecordingProfiles::default());
    let state = holder.state();
    assert!(state.loading);
    assert!(state.user.is_none());
}

#[tokio::test]
async fn test_sign_in_upserts_profile_and_exposes_user() {
    let profiles = RecordingProfiles::default();
    let holder = SessionHolder::new(profiles.clone());
    let mut watcher = holder.subscribe();

    holder.handle_event(AuthEvent::SignedIn(session(0))).await;

    assert!(!holder.is_loading());
    assert_eq!(holder.current_user().map(|u| u.id), Some("u1".to_string()));
    assert!(watcher.has_changed().unwrap());
    assert_eq!(watcher.borrow_and_update().user.as_ref().map(|u| u.id.as_str()), Some("u1"));

    let upserts = profiles.upserts.lock().unwrap();
    assert_eq!(upserts.len(), 1);
    assert_eq!(upserts[0].email.as_deref(), Some("ada@example.com"));
}

#[tokio::test]
async fn test_failed_profile_upsert_still_signs_in() {
    let profiles = RecordingProfiles {
        fail: true,
        ..Default::default()
    };
    let holder = SessionHolder::new(profiles.clone());

    holder.handle_event(AuthEvent::SignedIn(session(0))).await;

    assert_eq!(profiles.upserts.lock().unwrap().len(), 1);
    assert!(!holder.is_loading());
    assert_eq!(holder.current_user().map(|u| u.id), Some("u1".to_string()));
}

#[tokio::test]
async fn test_restored_session_does_not_upsert_and_sign_out_clears_user() {
    let profiles = RecordingProfiles::default();
    let holder = SessionHolder::new(profiles.clone());

    holder.handle_event(AuthEvent::InitialSession(Some(session(0)))).await;
    assert!(holder.current_user().is_some());
    assert!(profiles.upserts.lock().unwrap().is_empty());

    holder.handle_event(AuthEvent::SignedOut).await;
    assert!(holder.current_user().is_none());
    assert!(!holder.is_loading());
}

#[tokio::test]
async fn test_apply_pending_follows_auth_client_events() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let (_dir, _store, auth) = setup(&server);
    let profiles = RecordingProfiles::default();
    let holder = SessionHolder::new(profiles.clone());
    let mut events = auth.subscribe();

    auth.sign_in_with_callback(CALLBACK).await.unwrap();
    holder.apply_pending(&mut events).await;
    assert_eq!(holder.current_user().and_then(|u| u.email), Some("ada@example.com".to_string()));
    assert_eq!(profiles.upserts.lock().unwrap().len(), 1);

    auth.sign_out().await.unwrap();
    holder.apply_pending(&mut events).await;
    assert!(holder.current_user().is_none());
}

#[tokio::test]
async fn test_listen_applies_events_until_sender_closes() {
    let profiles = RecordingProfiles::default();
    let holder = Arc::new(SessionHolder::new(profiles.clone()));
    let (events, receiver) = tokio::sync::broadcast::channel(4);

    let task = {
        let holder = holder.clone();
        tokio::spawn(async move { holder.listen(receiver).await })
    };

    events.send(AuthEvent::SignedIn(session(0))).unwrap();
    events.send(AuthEvent::SignedOut).unwrap();
    drop(events);
    task.await.unwrap();

    assert_eq!(profiles.upserts.lock().unwrap().len(), 1);
    assert!(holder.current_user().is_none());
    assert!(!holder.is_loading());
}
