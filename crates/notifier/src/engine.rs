//! 提醒定时引擎
//!
//! 纯函数实现：`decide` 只读任务状态与评估时刻，产出调度决策；
//! `apply` 单独负责把决策写回任务。副作用（持久化、消息发送）
//! 全部留给调度器处理。

use chrono::{DateTime, Duration, Utc};
use todo_domain::entities::Todo;

/// 单个待办事项在某个评估时刻的调度决策
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// 本轮不提醒，定时器保持不变
    Skip,
    /// 触发提醒，并携带触发之后的下一次提醒时间
    Fire {
        next_notify_at: Option<DateTime<Utc>>,
    },
}

/// 懒初始化：首次观察到可调度且未设置定时器的任务时，
/// 将定时器设为当前评估时刻。返回是否发生了初始化。
pub fn ensure_timer(todo: &mut Todo, now: DateTime<Utc>) -> bool {
    if todo.is_notify_eligible() && todo.next_notify_at.is_none() {
        todo.next_notify_at = Some(now);
        return true;
    }
    false
}

/// 判定任务在 `now` 时刻是否触发提醒
///
/// 已过截止时间的任务静默跳过而不补发：过期之后的提醒没有价值。
pub fn decide(todo: &Todo, now: DateTime<Utc>) -> Decision {
    if !todo.is_notify_eligible() {
        return Decision::Skip;
    }
    if let Some(due) = todo.due_date {
        if now > due {
            return Decision::Skip;
        }
    }
    // 懒初始化之后定时器一定存在；这里兜底用now，保持decide为全函数
    let timer = todo.next_notify_at.unwrap_or(now);
    if timer > now {
        return Decision::Skip;
    }
    Decision::Fire {
        next_notify_at: next_after_fire(timer, todo.notify_frequency_minutes, todo.due_date),
    }
}

/// 把决策写回任务（仅修改 `next_notify_at`）
pub fn apply(todo: &mut Todo, decision: &Decision) {
    if let Decision::Fire { next_notify_at } = decision {
        todo.next_notify_at = *next_notify_at;
    }
}

/// 触发后的下一次提醒时间
///
/// 以触发前的定时值为基准推进，而不是评估时刻，保证提醒节奏
/// 不受调度抖动影响。推进结果越过截止时间时提醒链终止。
fn next_after_fire(
    base: DateTime<Utc>,
    frequency_minutes: i64,
    due_date: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    if frequency_minutes <= 0 {
        return None;
    }
    let candidate = base + Duration::minutes(frequency_minutes);
    match due_date {
        Some(due) if candidate > due => None,
        _ => Some(candidate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn base_todo() -> Todo {
        Todo::new(Uuid::new_v4(), "测试任务".to_string())
    }

    #[test]
    fn test_completed_todo_never_fires() {
        let mut todo = base_todo();
        todo.completed = true;
        todo.next_notify_at = Some(Utc::now() - Duration::minutes(5));

        assert_eq!(decide(&todo, Utc::now()), Decision::Skip);
    }

    #[test]
    fn test_lazy_init_only_touches_eligible_todos() {
        let now = Utc::now();

        let mut todo = base_todo();
        assert!(ensure_timer(&mut todo, now));
        assert_eq!(todo.next_notify_at, Some(now));

        // 已有定时器的不重复初始化
        assert!(!ensure_timer(&mut todo, now + Duration::minutes(1)));
        assert_eq!(todo.next_notify_at, Some(now));

        let mut muted = base_todo();
        muted.notify_enabled = false;
        assert!(!ensure_timer(&mut muted, now));
        assert!(muted.next_notify_at.is_none());
    }
}
