//! User profile rows

use crate::auth::client::User;
use crate::backend::client::BackendClient;
use crate::error::Result;
use chrono::{DateTime, Utc};
use log::debug;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::future::Future;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Names come from provider metadata; missing first/last parts are split from the full name.
    pub fn from_user(user: &User, now: DateTime<Utc>) -> Self {
        let full_name = user.full_name();

        let (split_first, split_last) = match full_name.as_deref() {
            Some(name) => match name.split_once(' ') {
                Some((first, rest)) => (Some(first.to_string()), Some(rest.trim().to_string())),
                None => (Some(name.to_string()), None),
            },
            None => (None, None),
        };

        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            first_name: user.given_name().map(str::to_string).or(split_first),
            last_name: user.family_name().map(str::to_string).or(split_last),
            full_name,
            updated_at: now,
        }
    }
}

/// Destination for the profile upsert made on sign-in
pub trait ProfileStore {
    fn upsert_profile(
        &self,
        profile: &Profile,
        access_token: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}

#[derive(Debug, Clone)]
pub struct RestProfileStore {
    client: BackendClient,
}

impl RestProfileStore {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

impl ProfileStore for RestProfileStore {
    async fn upsert_profile(&self, profile: &Profile, access_token: &str) -> Result<()> {
        let url = self.client.endpoint("rest/v1/profiles")?;
        let client = self.client.clone().with_access_token(access_token);
        let request = client
            .request(Method::POST, url)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(profile);

        client.send(request).await?;
        debug!("Upserted profile {}", profile.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn user(metadata: serde_json::Value) -> User {
        User {
            id: "user-1".to_string(),
            email: Some("ada@example.com".to_string()),
            user_metadata: metadata.as_object().cloned().unwrap_or_else(Map::new),
        }
    }

    #[test]
    fn test_profile_splits_full_name() {
        let profile = Profile::from_user(&user(json!({"full_name": "Ada King Lovelace"})), Utc::now());
        assert_eq!(profile.first_name.as_deref(), Some("Ada"));
        assert_eq!(profile.last_name.as_deref(), Some("King Lovelace"));
        assert_eq!(profile.full_name.as_deref(), Some("Ada King Lovelace"));
    }

    #[test]
    fn test_profile_prefers_explicit_name_parts() {
        let profile = Profile::from_user(
            &user(json!({"name": "Ada L", "given_name": "Ada", "family_name": "Lovelace"})),
            Utc::now(),
        );
        assert_eq!(profile.last_name.as_deref(), Some("Lovelace"));
    }

    #[test]
    fn test_profile_without_metadata() {
        let profile = Profile::from_user(&user(json!({})), Utc::now());
        assert_eq!(profile.id, "user-1");
        assert!(profile.full_name.is_none());
        assert!(profile.first_name.is_none());
    }
}
