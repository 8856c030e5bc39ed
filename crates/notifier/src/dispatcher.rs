use std::sync::Arc;

use tracing::{debug, warn};

use todo_domain::entities::Todo;

use crate::channels::MessageChannel;

/// 提醒消息分发器
///
/// 对触发提醒的任务渲染消息并向所有启用的通道尽力投递。
/// 各通道相互独立：单个通道失败只记录日志，既不影响其他通道，
/// 也不阻止定时引擎推进。本轮失败的通道没有重试，下一次触发
/// 时才有机会再次投递。
pub struct ReminderDispatcher {
    channels: Vec<Arc<dyn MessageChannel>>,
}

impl ReminderDispatcher {
    pub fn new(channels: Vec<Arc<dyn MessageChannel>>) -> Self {
        Self { channels }
    }

    /// 渲染展示用的提醒文本，格式不构成API契约
    pub fn render(todo: &Todo) -> String {
        let due = todo
            .due_date
            .map(|d| d.to_rfc2822())
            .unwrap_or_else(|| "no due date".to_string());
        format!(
            "Reminder: {}\nDue: {}\nPriority: {}\nTask ID: {}",
            todo.title, due, todo.priority, todo.id
        )
    }

    /// 向任务启用的全部通道投递消息，无返回值
    pub async fn deliver(&self, todo: &Todo, message: &str) {
        for channel in &self.channels {
            let kind = channel.kind();
            if !todo.channel_enabled(kind) {
                continue;
            }
            match channel.send_direct_message(message).await {
                Ok(()) => {
                    debug!("已通过 {} 通道发送待办 {} 的提醒", kind.as_str(), todo.id);
                }
                Err(e) => {
                    warn!(
                        "通过 {} 通道发送待办 {} 的提醒失败: {}",
                        kind.as_str(),
                        todo.id,
                        e
                    );
                }
            }
        }
    }
}
