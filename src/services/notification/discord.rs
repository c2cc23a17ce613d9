use async_trait::async_trait;
use serde::Deserialize;

use super::{ChannelType, NotificationMessage, NotificationProvider, SendResult};

const DISCORD_API: &str = "https://discord.com/api/v10";

/// Direct messages from a bot account. The recipient is the user's Discord id;
/// the bot must share a server with them.
pub struct DiscordProvider {
    bot_token: String,
    api_base: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct DmChannel {
    id: String,
}

impl DiscordProvider {
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self::with_api_base(bot_token, DISCORD_API)
    }

    pub fn with_api_base(bot_token: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.bot_token)
    }

    async fn open_dm_channel(&self, recipient_id: &str) -> Result<String, String> {
        let response = self
            .client
            .post(format!("{}/users/@me/channels", self.api_base))
            .header("Authorization", self.auth_header())
            .json(&serde_json::json!({ "recipient_id": recipient_id }))
            .send()
            .await
            .map_err(|e| format!("Failed to reach Discord: {}", e))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(format!("Failed to create DM channel: {}", error_text));
        }

        let channel: DmChannel = response
            .json()
            .await
            .map_err(|e| format!("Unexpected DM channel response: {}", e))?;
        Ok(channel.id)
    }

    async fn send_dm(&self, recipient_id: &str, content: &str) -> SendResult {
        let channel_id = match self.open_dm_channel(recipient_id).await {
            Ok(id) => id,
            Err(e) => return SendResult::failed(e),
        };

        let result = self
            .client
            .post(format!("{}/channels/{}/messages", self.api_base, channel_id))
            .header("Authorization", self.auth_header())
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => SendResult::ok(),
            Ok(response) => {
                let error_text = response.text().await.unwrap_or_default();
                SendResult::failed(format!("Discord API error: {}", error_text))
            }
            Err(e) => SendResult::failed(format!("Failed to send Discord message: {}", e)),
        }
    }
}

#[async_trait]
impl NotificationProvider for DiscordProvider {
    fn channel_type(&self) -> ChannelType {
        ChannelType::Discord
    }

    async fn send(&self, message: &NotificationMessage) -> SendResult {
        let content = format!("**{}**\n\n{}", message.title, message.body);
        self.send_dm(&message.recipient, &content).await
    }
}
