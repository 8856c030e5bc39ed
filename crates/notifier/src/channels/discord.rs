use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use todo_core::{config::DiscordConfig, TodoError, TodoResult};
use todo_domain::entities::ChannelKind;

use super::MessageChannel;

const DISCORD_API_BASE: &str = "https://discord.com/api/v10";

/// 通过Discord REST API发送私聊消息的通道
///
/// 每次发送先为固定的收件人创建（或复用）DM频道，再向该频道
/// 投递消息，与Discord官方的私聊流程一致。
pub struct DiscordChannel {
    client: reqwest::Client,
    bot_token: String,
    owner_user_id: String,
}

#[derive(Debug, Deserialize)]
struct DmChannel {
    id: String,
}

impl DiscordChannel {
    pub fn new(config: &DiscordConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            bot_token: config.bot_token.clone(),
            owner_user_id: config.owner_user_id.trim().to_string(),
        }
    }

    async fn open_dm_channel(&self) -> TodoResult<DmChannel> {
        let response = self
            .client
            .post(format!("{DISCORD_API_BASE}/users/@me/channels"))
            .header("Authorization", format!("Bot {}", self.bot_token))
            .json(&json!({ "recipient_id": self.owner_user_id }))
            .send()
            .await
            .map_err(|e| TodoError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TodoError::Channel {
                channel: "discord",
                message: format!("创建DM频道失败，状态 {}", response.status()),
            });
        }
        response
            .json::<DmChannel>()
            .await
            .map_err(|e| TodoError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl MessageChannel for DiscordChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Discord
    }

    async fn send_direct_message(&self, text: &str) -> TodoResult<()> {
        if self.owner_user_id.is_empty() {
            return Err(TodoError::Configuration(
                "未配置Discord收件人用户id".to_string(),
            ));
        }

        let dm = self.open_dm_channel().await?;
        let response = self
            .client
            .post(format!("{DISCORD_API_BASE}/channels/{}/messages", dm.id))
            .header("Authorization", format!("Bot {}", self.bot_token))
            .json(&json!({ "content": text }))
            .send()
            .await
            .map_err(|e| TodoError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TodoError::Channel {
                channel: "discord",
                message: format!("发送消息失败，状态 {}", response.status()),
            });
        }
        Ok(())
    }
}
