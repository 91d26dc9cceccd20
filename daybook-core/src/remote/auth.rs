//! User accounts on the daybook server.
//!
//! Sign-in happens with an external identity provider; the server only
//! records the profile under the provider's user id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{USER_HEADER, read_json, require_user};
use crate::error::CoreResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "photoURL", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile details sent when signing in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "photoURL", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

#[derive(Deserialize)]
struct UserEnvelope {
    user: User,
}

pub struct AuthApi {
    http: reqwest::Client,
    base_url: String,
}

impl AuthApi {
    pub fn new(http: reqwest::Client, api_url: &str) -> Self {
        AuthApi {
            http,
            base_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// POST /auth
    pub async fn create_or_get_user(&self, user_id: &str, profile: &UserProfile) -> CoreResult<User> {
        require_user(user_id)?;
        let resp = self
            .http
            .post(format!("{}/auth", self.base_url))
            .header(USER_HEADER, user_id)
            .json(profile)
            .send()
            .await?;
        let envelope: UserEnvelope = read_json(resp).await?;
        Ok(envelope.user)
    }

    /// GET /auth/me
    pub async fn me(&self, user_id: &str) -> CoreResult<User> {
        require_user(user_id)?;
        let resp = self
            .http
            .get(format!("{}/auth/me", self.base_url))
            .header(USER_HEADER, user_id)
            .send()
            .await?;
        let envelope: UserEnvelope = read_json(resp).await?;
        Ok(envelope.user)
    }
}
