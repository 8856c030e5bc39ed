//! 到期提醒子系统
//!
//! 由三部分组成：纯逻辑的定时引擎（`engine`）、尽力而为的
//! 消息分发器（`dispatcher`/`channels`）、以及驱动二者的
//! 周期调度器（`scheduler`）。

pub mod channels;
pub mod dispatcher;
pub mod engine;
pub mod scheduler;

pub use channels::{DiscordChannel, MessageChannel, TelegramChannel};
pub use dispatcher::ReminderDispatcher;
pub use engine::Decision;
pub use scheduler::ReminderScheduler;
