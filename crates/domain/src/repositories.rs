//! 领域仓储抽象
//!
//! 定义数据访问的抽象接口，遵循依赖倒置原则

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use todo_core::TodoResult;
use uuid::Uuid;

use crate::entities::{ReorderEntry, Todo, TodoFilter};

/// 待办事项仓储抽象
///
/// API层与提醒调度器共享同一个仓储实例，二者的读改写周期不加事务，
/// 以最后一次写入为准（见提醒调度器的幂等性说明）。
#[async_trait]
pub trait TodoRepository: Send + Sync {
    async fn create(&self, todo: &Todo) -> TodoResult<Todo>;
    async fn find_by_id(&self, id: Uuid, user_id: Uuid) -> TodoResult<Option<Todo>>;
    async fn list_for_user(&self, user_id: Uuid, filter: &TodoFilter) -> TodoResult<Vec<Todo>>;
    async fn update(&self, todo: &Todo) -> TodoResult<Todo>;
    async fn delete(&self, id: Uuid, user_id: Uuid) -> TodoResult<bool>;

    /// 标记完成并在同一次写入中清空提醒定时器
    async fn mark_completed(
        &self,
        id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> TodoResult<Option<Todo>>;

    /// 在单个事务中批量更新排序
    async fn reorder(&self, user_id: Uuid, entries: &[ReorderEntry]) -> TodoResult<()>;

    /// 加载提醒批次：`notify_enabled = true AND completed = false`
    async fn find_notify_eligible(&self) -> TodoResult<Vec<Todo>>;

    /// 幂等地保存提醒定时器状态（至少包含 `next_notify_at`）
    async fn save_notification_state(&self, todo: &Todo) -> TodoResult<()>;
}
