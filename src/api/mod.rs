//! Minimal Helix REST client.
//!
//! Every call fetches a bearer token from the [`oauth`](crate::oauth)
//! client, sends the `Authorization`, `Client-Id` and `Content-Type`
//! headers, and turns any non-2xx status into [`ApiError::Status`].
//! Requests are not retried and responses are not cached.

mod eventsub;
mod moderation;
mod streams;
mod users;

#[cfg(test)]
pub(crate) mod mock;

use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::ApiError;
use crate::oauth;

pub use self::eventsub::{Subscription, SubscriptionStatus, SubscriptionTransport, SubscriptionType};
pub use self::streams::Stream;
pub use self::users::User;

/// Helix base URL.
pub const BASE_URL: &str = "https://api.twitch.tv/helix";

/// Query string pairs; keys may repeat.
pub(crate) type Query<'a> = Vec<(&'static str, &'a str)>;

/// The `{"data": [...], "pagination": {...}}` envelope of list endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Pagination {
    #[serde(default)]
    pub cursor: Option<String>,
}

/// Helix API client for one Twitch application.
#[derive(Clone, Debug)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    oauth: Arc<oauth::Client>,
    webhook_secret: String,
}

impl Client {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self::with_oauth(oauth::Client::new(client_id, client_secret))
    }

    /// Use an already configured token source.
    pub fn with_oauth(oauth: oauth::Client) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: BASE_URL.to_string(),
            oauth: Arc::new(oauth),
            webhook_secret: String::new(),
        }
    }

    /// Send requests to another Helix-compatible endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Secret Twitch signs webhook notifications with.
    #[must_use]
    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.webhook_secret = secret.into();
        self
    }

    pub fn oauth(&self) -> &oauth::Client {
        &self.oauth
    }

    /// Perform one call and return the raw response body.
    pub(crate) async fn call(
        &self,
        method: Method,
        endpoint: &str,
        query: &Query<'_>,
        body: Option<serde_json::Value>,
    ) -> Result<String, ApiError> {
        let token = self
            .oauth
            .token()
            .await
            .map_err(|e| ApiError::Token(Box::new(e)))?;

        debug!("{} {}", method, endpoint);
        let mut request = self
            .http
            .request(method, format!("{}{}", self.base_url, endpoint))
            .query(query)
            .bearer_auth(token)
            .header("Client-Id", self.oauth.client_id())
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.body(body.to_string());
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status { status, body });
        }
        Ok(body)
    }

    /// `GET` a list endpoint and return its first page.
    pub(crate) async fn get_page<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &Query<'_>,
    ) -> Result<Page<T>, ApiError> {
        let body = self.call(Method::GET, endpoint, query, None).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// One `(key, value)` pair per value.
pub(crate) fn repeated<'a>(key: &'static str, values: &'a [&'a str]) -> Query<'a> {
    values.iter().map(|v| (key, *v)).collect()
}
