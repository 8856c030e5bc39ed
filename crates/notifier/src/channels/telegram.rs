use async_trait::async_trait;
use serde_json::json;

use todo_core::{config::TelegramConfig, TodoError, TodoResult};
use todo_domain::entities::ChannelKind;

use super::MessageChannel;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// 通过Telegram Bot API发送私聊消息的通道
pub struct TelegramChannel {
    client: reqwest::Client,
    bot_token: String,
    owner_chat_id: String,
}

impl TelegramChannel {
    pub fn new(config: &TelegramConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            bot_token: config.bot_token.clone(),
            owner_chat_id: config.owner_chat_id.trim().to_string(),
        }
    }
}

#[async_trait]
impl MessageChannel for TelegramChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Telegram
    }

    async fn send_direct_message(&self, text: &str) -> TodoResult<()> {
        let chat_id: i64 = self.owner_chat_id.parse().map_err(|_| {
            TodoError::Configuration(format!(
                "无效的Telegram chat id: {:?}",
                self.owner_chat_id
            ))
        })?;

        let url = format!("{TELEGRAM_API_BASE}/bot{}/sendMessage", self.bot_token);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "chat_id": chat_id, "text": text }))
            .send()
            .await
            .map_err(|e| TodoError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TodoError::Channel {
                channel: "telegram",
                message: format!("sendMessage 返回状态 {}", response.status()),
            });
        }
        Ok(())
    }
}
