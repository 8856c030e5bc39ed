pub mod discord;
pub mod telegram;

use async_trait::async_trait;
use todo_core::TodoResult;
use todo_domain::entities::ChannelKind;

pub use discord::DiscordChannel;
pub use telegram::TelegramChannel;

/// 出站消息通道抽象
///
/// 目的地在构造时由配置固定（进程级单一收件人），任务级开关只
/// 决定是否使用该通道，不决定消息发到哪里。
#[async_trait]
pub trait MessageChannel: Send + Sync {
    fn kind(&self) -> ChannelKind;

    /// 尽力而为的单条消息投递，失败由调用方记录日志后忽略
    async fn send_direct_message(&self, text: &str) -> TodoResult<()>;
}
