use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_PRIORITY: &str = "medium";
pub const DEFAULT_NOTIFY_FREQUENCY_MINUTES: i64 = 60;

/// 待办事项实体
///
/// 提醒相关字段的约定：`next_notify_at` 为 `None` 表示尚未安排或
/// 不再安排提醒；任务完成后该字段必须被清空。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Todo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: String,
    pub completed: bool,
    pub notify_enabled: bool,
    /// 提醒重复间隔（分钟），0表示只提醒一次
    pub notify_frequency_minutes: i64,
    pub order_index: i64,
    pub telegram_enabled: bool,
    pub discord_enabled: bool,
    /// 下一次提醒时间，由提醒引擎维护
    pub next_notify_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    pub fn new(user_id: Uuid, title: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title,
            description: String::new(),
            due_date: None,
            priority: DEFAULT_PRIORITY.to_string(),
            completed: false,
            notify_enabled: true,
            notify_frequency_minutes: DEFAULT_NOTIFY_FREQUENCY_MINUTES,
            order_index: 0,
            telegram_enabled: false,
            discord_enabled: false,
            next_notify_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// 是否参与提醒调度
    pub fn is_notify_eligible(&self) -> bool {
        self.notify_enabled && !self.completed
    }

    /// 标记完成，同时清空提醒定时器
    pub fn mark_completed(&mut self, now: DateTime<Utc>) {
        self.completed = true;
        self.next_notify_at = None;
        self.updated_at = now;
    }

    pub fn channel_enabled(&self, kind: ChannelKind) -> bool {
        match kind {
            ChannelKind::Telegram => self.telegram_enabled,
            ChannelKind::Discord => self.discord_enabled,
        }
    }
}

/// 消息通道类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelKind {
    #[serde(rename = "telegram")]
    Telegram,
    #[serde(rename = "discord")]
    Discord,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Telegram => "telegram",
            ChannelKind::Discord => "discord",
        }
    }
}

/// 列表查询过滤条件
#[derive(Debug, Clone, Default)]
pub struct TodoFilter {
    pub priority: Option<String>,
    pub completed: Option<bool>,
    pub due_before: Option<DateTime<Utc>>,
}

/// 批量排序请求中的单项
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderEntry {
    pub id: Uuid,
    pub index: i64,
}
