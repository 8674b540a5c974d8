//! Bearer tokens for the Helix API.
//!
//! [`Client::token`] hands out the last token while it is valid. Once it has
//! expired a new one is requested, with the refresh-token grant when a
//! refresh token is known and the client-credentials grant otherwise.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde::Deserialize;
use tokio::time::Instant;
use tracing::debug;

use crate::error::ApiError;

/// Twitch's OAuth token endpoint.
pub const TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: u64,
}

#[derive(Debug, Default)]
struct Cached {
    access_token: String,
    refresh_token: String,
    expires_at: Option<Instant>,
}

impl Cached {
    fn valid_token(&self) -> Option<&str> {
        match self.expires_at {
            Some(at) if at > Instant::now() => Some(&self.access_token),
            _ => None,
        }
    }
}

/// Token source for one Twitch application.
#[derive(Debug)]
pub struct Client {
    http: reqwest::Client,
    url: String,
    client_id: String,
    client_secret: String,
    scope: String,
    cached: Mutex<Cached>,
}

impl Client {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: TOKEN_URL.to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope: String::new(),
            cached: Mutex::new(Cached::default()),
        }
    }

    /// Request tokens from another endpoint.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Space-separated scopes for the client-credentials grant.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Use `refresh_token` for the next token request and forget the
    /// current token.
    pub fn set_refresh_token(&self, refresh_token: impl Into<String>) {
        *self.cached.lock().unwrap_or_else(PoisonError::into_inner) = Cached {
            refresh_token: refresh_token.into(),
            ..Cached::default()
        };
    }

    /// A currently valid bearer token.
    pub async fn token(&self) -> Result<String, ApiError> {
        let refresh_token = {
            let cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(token) = cached.valid_token() {
                return Ok(token.to_string());
            }
            cached.refresh_token.clone()
        };

        let mut form = vec![
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];
        if refresh_token.is_empty() {
            debug!("requesting app token");
            form.push(("grant_type", "client_credentials"));
            if !self.scope.is_empty() {
                form.push(("scope", self.scope.as_str()));
            }
        } else {
            debug!("refreshing token");
            form.push(("grant_type", "refresh_token"));
            form.push(("refresh_token", refresh_token.as_str()));
        }

        let response = self.http.post(&self.url).form(&form).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status { status, body });
        }
        let token: TokenResponse = serde_json::from_str(&body)?;

        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        *cached = Cached {
            access_token: token.access_token.clone(),
            refresh_token: token.refresh_token.unwrap_or(refresh_token),
            expires_at: Some(Instant::now() + Duration::from_secs(token.expires_in)),
        };
        Ok(token.access_token)
    }
}
