use reqwest::Method;

use super::Client;
use crate::error::ApiError;

impl Client {
    /// Delete one chat message, acting as the token's user.
    ///
    /// `broadcaster_id` defaults to the token's user, i.e. the bot's own
    /// channel. Requires a user token with `moderator:manage:chat_messages`.
    pub async fn delete_chat_message(
        &self,
        broadcaster_id: Option<&str>,
        message_id: &str,
    ) -> Result<(), ApiError> {
        let moderator_id = self
            .current_user()
            .await?
            .map(|user| user.id)
            .unwrap_or_default();
        let broadcaster_id = broadcaster_id.unwrap_or(&moderator_id);

        let query = vec![
            ("broadcaster_id", broadcaster_id),
            ("moderator_id", moderator_id.as_str()),
            ("message_id", message_id),
        ];
        self.call(Method::DELETE, "/moderation/chat", &query, None)
            .await
            .map(drop)
    }
}
