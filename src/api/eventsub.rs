use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{Client, Page};
use crate::error::ApiError;

const ENDPOINT: &str = "/eventsub/subscriptions";

/// EventSub event types this client can subscribe to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubscriptionType {
    ChannelUpdate,
    StreamOnline,
    StreamOffline,
    Other(String),
}

impl SubscriptionType {
    /// Wire version Twitch expects for this type.
    pub fn version(&self) -> &'static str {
        match self {
            SubscriptionType::ChannelUpdate => "2",
            _ => "1",
        }
    }
}

impl AsRef<str> for SubscriptionType {
    fn as_ref(&self) -> &str {
        match self {
            SubscriptionType::ChannelUpdate => "channel.update",
            SubscriptionType::StreamOnline => "stream.online",
            SubscriptionType::StreamOffline => "stream.offline",
            SubscriptionType::Other(s) => s,
        }
    }
}

impl fmt::Display for SubscriptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<String> for SubscriptionType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "channel.update" => SubscriptionType::ChannelUpdate,
            "stream.online" => SubscriptionType::StreamOnline,
            "stream.offline" => SubscriptionType::StreamOffline,
            _ => SubscriptionType::Other(s),
        }
    }
}

impl From<SubscriptionType> for String {
    fn from(t: SubscriptionType) -> Self {
        t.as_ref().to_string()
    }
}

/// Subscription state as reported by Twitch, e.g. `enabled` or
/// `webhook_callback_verification_pending`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionStatus(pub String);

impl SubscriptionStatus {
    pub fn is_enabled(&self) -> bool {
        self.0 == "enabled"
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Where notifications are delivered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum SubscriptionTransport {
    Webhook {
        callback: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        secret: String,
    },
    Websocket {
        session_id: String,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "SubscriptionStatus::is_empty")]
    pub status: SubscriptionStatus,
    #[serde(rename = "type")]
    pub kind: SubscriptionType,
    pub version: String,
    pub condition: HashMap<String, String>,
    pub transport: SubscriptionTransport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cost: u32,
}

impl Client {
    /// All subscriptions of this application, following pagination.
    pub async fn subscriptions(&self, only_enabled: bool) -> Result<Vec<Subscription>, ApiError> {
        let mut all = Vec::new();
        let mut after: Option<String> = None;
        loop {
            let mut query = Vec::new();
            if only_enabled {
                query.push(("status", "enabled"));
            }
            if let Some(cursor) = after.as_deref() {
                query.push(("after", cursor));
            }
            let page: Page<Subscription> = self.get_page(ENDPOINT, &query).await?;
            all.extend(page.data);
            match page.pagination.cursor.filter(|c| !c.is_empty()) {
                Some(cursor) => after = Some(cursor),
                None => return Ok(all),
            }
        }
    }

    /// Subscribe to `kind` for `broadcaster_id`, delivered to a webhook.
    pub async fn subscribe(
        &self,
        broadcaster_id: &str,
        callback_url: &str,
        kind: SubscriptionType,
    ) -> Result<(), ApiError> {
        let subscription = Subscription {
            id: String::new(),
            status: SubscriptionStatus::default(),
            version: kind.version().to_string(),
            kind,
            condition: HashMap::from([(
                "broadcaster_user_id".to_string(),
                broadcaster_id.to_string(),
            )]),
            transport: SubscriptionTransport::Webhook {
                callback: callback_url.to_string(),
                secret: self.webhook_secret.clone(),
            },
            created_at: None,
            cost: 0,
        };
        let body = serde_json::to_value(&subscription)?;
        self.call(Method::POST, ENDPOINT, &Vec::new(), Some(body))
            .await
            .map(drop)
    }

    pub async fn delete_subscription(&self, id: &str) -> Result<(), ApiError> {
        self.call(Method::DELETE, ENDPOINT, &vec![("id", id)], None)
            .await
            .map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock;
    use crate::oauth;

    fn page(id: &str, cursor: &str) -> String {
        format!(
            r#"{{"total":2,"data":[{{"id":"{}","status":"enabled","type":"stream.online","version":"1",
            "condition":{{"broadcaster_user_id":"1"}},"created_at":"2020-11-10T14:32:18.730260295Z",
            "transport":{{"method":"webhook","callback":"https://example.com/cb"}},"cost":1}}],
            "pagination":{{"cursor":"{}"}}}}"#,
            id, cursor
        )
    }

    #[test]
    fn test_type_names_and_versions() {
        assert_eq!(SubscriptionType::ChannelUpdate.to_string(), "channel.update");
        assert_eq!(SubscriptionType::ChannelUpdate.version(), "2");
        assert_eq!(SubscriptionType::StreamOffline.version(), "1");
        assert_eq!(
            SubscriptionType::from("channel.follow".to_string()),
            SubscriptionType::Other("channel.follow".into())
        );
    }

    #[test]
    fn test_subscription_encoding() {
        let sub = Subscription {
            id: String::new(),
            status: SubscriptionStatus::default(),
            kind: SubscriptionType::StreamOnline,
            version: "1".into(),
            condition: HashMap::from([("broadcaster_user_id".into(), "1".into())]),
            transport: SubscriptionTransport::Webhook {
                callback: "https://example.com/cb".into(),
                secret: "s3cret".into(),
            },
            created_at: None,
            cost: 0,
        };
        let json = serde_json::to_value(&sub).unwrap();
        assert_eq!(json["type"], "stream.online");
        assert_eq!(json["transport"]["method"], "webhook");
        assert_eq!(json["transport"]["secret"], "s3cret");
        assert!(json.get("id").is_none());
    }

    #[tokio::test]
    async fn test_subscriptions_follow_cursor() {
        let first: &'static str = Box::leak(page("a", "next").into_boxed_str());
        let second: &'static str = Box::leak(page("b", "").into_boxed_str());
        let auth = mock::serve(vec![(200, r#"{"access_token":"t","expires_in":60}"#)]).await;
        let helix = mock::serve(vec![(200, first), (200, second)]).await;
        let client = Client::with_oauth(oauth::Client::new("cid", "s").with_url(auth.url("/t")))
            .with_base_url(helix.url(""));

        let subs = client.subscriptions(true).await.unwrap();
        let ids: Vec<_> = subs.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(subs[0].status.is_enabled());

        let requests = helix.requests();
        assert!(requests[0].starts_with("GET /eventsub/subscriptions?status=enabled "));
        assert!(requests[1].starts_with("GET /eventsub/subscriptions?status=enabled&after=next "));
    }

    #[tokio::test]
    async fn test_subscribe_posts_webhook() {
        let auth = mock::serve(vec![(200, r#"{"access_token":"t","expires_in":60}"#)]).await;
        let helix = mock::serve(vec![(202, r#"{"data":[]}"#)]).await;
        let client = Client::with_oauth(oauth::Client::new("cid", "s").with_url(auth.url("/t")))
            .with_base_url(helix.url(""))
            .with_webhook_secret("s3cret");

        client
            .subscribe("1", "https://example.com/cb", SubscriptionType::ChannelUpdate)
            .await
            .unwrap();

        let request = &helix.requests()[0];
        assert!(request.starts_with("POST /eventsub/subscriptions "));
        assert!(request.contains(r#""version":"2""#));
        assert!(request.contains(r#""secret":"s3cret""#));
    }
}
