use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{repeated, Client};
use crate::error::ApiError;

/// A Twitch account.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub login: String,
    pub display_name: String,
    /// `admin`, `global_mod`, `staff` or empty.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// `affiliate`, `partner` or empty.
    #[serde(default)]
    pub broadcaster_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub profile_image_url: String,
    #[serde(default)]
    pub offline_image_url: String,
    /// Only present with the `user:read:email` scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Client {
    pub async fn users_by_id(&self, ids: &[&str]) -> Result<Vec<User>, ApiError> {
        self.users("id", ids).await
    }

    pub async fn users_by_login(&self, logins: &[&str]) -> Result<Vec<User>, ApiError> {
        self.users("login", logins).await
    }

    /// The user the bearer token belongs to, if it is a user token.
    pub async fn current_user(&self) -> Result<Option<User>, ApiError> {
        Ok(self.get_page("/users", &Vec::new()).await?.data.into_iter().next())
    }

    async fn users(&self, key: &'static str, values: &[&str]) -> Result<Vec<User>, ApiError> {
        if values.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.get_page("/users", &repeated(key, values)).await?.data)
    }
}
