//! Current-user state derived from auth events

use crate::auth::client::{AuthEvent, Session, User};
use crate::backend::profiles::{Profile, ProfileStore};
use chrono::Utc;
use log::{debug, info, warn};
use tokio::sync::{broadcast, watch};

#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }
}

/// Holds the signed-in user and publishes changes to whoever subscribed.
///
/// Passed explicitly to the parts of the program that need the current user.
pub struct SessionHolder<P> {
    profiles: P,
    state: watch::Sender<AuthState>,
}

impl<P: ProfileStore> SessionHolder<P> {
    pub fn new(profiles: P) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        Self { profiles, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub async fn handle_event(&self, event: AuthEvent) {
        match event {
            AuthEvent::SignedIn(session) => {
                self.upsert_profile(&session).await;
                self.publish(Some(session.user));
            }
            AuthEvent::InitialSession(Some(session)) => {
                debug!("Restored session for {}", session.user.id);
                self.publish(Some(session.user));
            }
            AuthEvent::TokenRefreshed(session) => {
                debug!("Token refreshed for {}", session.user.id);
                self.publish(Some(session.user));
            }
            AuthEvent::InitialSession(None) | AuthEvent::SignedOut => {
                self.publish(None);
            }
        }
    }

    /// Apply whatever events are already queued, without waiting
    pub async fn apply_pending(&self, events: &mut broadcast::Receiver<AuthEvent>) {
        loop {
            match events.try_recv() {
                Ok(event) => self.handle_event(event).await,
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!("Missed {} auth events", skipped);
                }
                Err(_) => break,
            }
        }
    }

    /// Apply events until the sender side goes away
    pub async fn listen(&self, mut events: broadcast::Receiver<AuthEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => self.handle_event(event).await,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Missed {} auth events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    fn publish(&self, user: Option<User>) {
        self.state.send_replace(AuthState {
            user,
            loading: false,
        });
    }

    /// Failures are logged and otherwise ignored
    async fn upsert_profile(&self, session: &Session) {
        let profile = Profile::from_user(&session.user, Utc::now());
        match self.profiles.upsert_profile(&profile, &session.access_token).await {
            Ok(()) => info!("Profile synced for {}", profile.id),
            Err(e) => warn!("Profile upsert failed for {}: {}", profile.id, e),
        }
    }
}
