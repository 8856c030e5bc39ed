use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use todo_domain::repositories::TodoRepository;

use crate::dispatcher::ReminderDispatcher;
use crate::engine::{self, Decision};

/// 提醒周期调度器
///
/// 每个扫描周期加载一批可提醒的任务，按 评估 → 投递 → 持久化
/// 的顺序逐个处理。批内所有错误就地消化，不会中断剩余任务，
/// 更不会让后台循环退出。
pub struct ReminderScheduler {
    todo_repo: Arc<dyn TodoRepository>,
    dispatcher: ReminderDispatcher,
}

impl ReminderScheduler {
    pub fn new(todo_repo: Arc<dyn TodoRepository>, dispatcher: ReminderDispatcher) -> Self {
        Self {
            todo_repo,
            dispatcher,
        }
    }

    /// 周期运行直到收到关闭信号
    ///
    /// 每个tick内的批处理同步跑完才会等待下一个tick，因此同一
    /// 时刻最多只有一个批次在处理。
    pub async fn run(
        self: Arc<Self>,
        interval_seconds: u64,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(interval_seconds));
        info!("提醒调度器启动，扫描间隔 {} 秒", interval_seconds);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.scan_once(Utc::now()).await;
                }
                _ = shutdown_rx.recv() => {
                    info!("提醒调度器收到关闭信号");
                    break;
                }
            }
        }
    }

    /// 处理一个批次，返回本轮触发提醒的任务数
    ///
    /// 批次加载失败时放弃整轮扫描，等待下一个tick自动重试；
    /// 单个任务的保存失败只跳过该任务。由于定时器比较是稳定的，
    /// 重复评估是幂等的，中途放弃最多让提醒延后一个周期。
    pub async fn scan_once(&self, now: DateTime<Utc>) -> usize {
        let todos = match self.todo_repo.find_notify_eligible().await {
            Ok(todos) => todos,
            Err(e) => {
                error!("加载提醒批次失败: {}", e);
                return 0;
            }
        };

        debug!("开始扫描，共 {} 个候选任务", todos.len());
        let mut fired = 0;

        for mut todo in todos {
            // 懒初始化的定时器立即持久化；失败也继续用内存值评估
            if engine::ensure_timer(&mut todo, now) {
                if let Err(e) = self.todo_repo.save_notification_state(&todo).await {
                    warn!("持久化待办 {} 的初始定时器失败: {}", todo.id, e);
                }
            }

            let decision = engine::decide(&todo, now);
            if let Decision::Fire { .. } = decision {
                let message = ReminderDispatcher::render(&todo);
                self.dispatcher.deliver(&todo, &message).await;

                engine::apply(&mut todo, &decision);
                if let Err(e) = self.todo_repo.save_notification_state(&todo).await {
                    warn!("保存待办 {} 的定时器状态失败，跳过: {}", todo.id, e);
                    continue;
                }
                fired += 1;
            }
        }

        if fired > 0 {
            info!("本轮扫描触发了 {} 个提醒", fired);
        }
        fired
    }
}
