use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{repeated, Client};
use crate::error::ApiError;

/// A live broadcast.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    pub id: String,
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    #[serde(default)]
    pub game_id: String,
    #[serde(default)]
    pub game_name: String,
    /// `live`, or empty on error.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub viewer_count: u64,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub language: String,
    /// Contains `{width}x{height}` placeholders.
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub is_mature: bool,
}

impl Client {
    /// Streams of the given broadcaster IDs that are currently live.
    pub async fn streams_by_id(&self, user_ids: &[&str]) -> Result<Vec<Stream>, ApiError> {
        self.streams("user_id", user_ids).await
    }

    /// Streams of the given broadcaster logins that are currently live.
    pub async fn streams_by_login(&self, logins: &[&str]) -> Result<Vec<Stream>, ApiError> {
        self.streams("user_login", logins).await
    }

    async fn streams(&self, key: &'static str, values: &[&str]) -> Result<Vec<Stream>, ApiError> {
        if values.is_empty() {
            return Ok(Vec::new());
        }
        let mut query = repeated(key, values);
        query.push(("first", "100"));
        Ok(self.get_page("/streams", &query).await?.data)
    }
}
