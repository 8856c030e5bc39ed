use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, sync::broadcast};
use tracing::{error, info, warn};
use uuid::Uuid;

use todo_api::{
    auth::{AdminCredentials, JwtService},
    create_app, AppState,
};
use todo_core::AppConfig;
use todo_domain::TodoRepository;
use todo_infrastructure::SqliteTodoRepository;
use todo_notifier::{
    DiscordChannel, MessageChannel, ReminderDispatcher, ReminderScheduler, TelegramChannel,
};

/// 主应用程序
///
/// 持有仓储与配置，API服务器和提醒调度器共享同一个仓储实例。
pub struct Application {
    config: AppConfig,
    todo_repo: Arc<dyn TodoRepository>,
}

impl Application {
    /// 创建新的应用实例
    pub async fn new(config: AppConfig) -> Result<Self> {
        info!("初始化应用程序，数据库: {}", config.database.url);

        let todo_repo = SqliteTodoRepository::new_embedded(&config.database.url)
            .await
            .context("初始化数据库失败")?;

        Ok(Self {
            config,
            todo_repo: Arc::new(todo_repo),
        })
    }

    /// 运行应用程序，直到收到关闭信号
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        // 启动提醒调度器（如果启用）
        let scheduler_handle = if self.config.notifier.enabled {
            let channels = self.build_channels();
            if channels.is_empty() {
                warn!("提醒功能已启用，但没有配置任何消息通道");
            }

            let scheduler = Arc::new(ReminderScheduler::new(
                Arc::clone(&self.todo_repo),
                ReminderDispatcher::new(channels),
            ));
            let interval = self.config.notifier.scan_interval_seconds;
            let shutdown_rx = shutdown_rx.resubscribe();

            Some(tokio::spawn(async move {
                scheduler.run(interval, shutdown_rx).await;
            }))
        } else {
            info!("提醒调度器已禁用");
            None
        };

        // 启动API服务器
        let state = self.build_app_state()?;
        let app = create_app(state, self.config.api.cors_enabled);

        let listener = TcpListener::bind(&self.config.api.bind_address)
            .await
            .with_context(|| format!("绑定地址失败: {}", self.config.api.bind_address))?;
        info!("API服务器启动在 http://{}", self.config.api.bind_address);

        let server_handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app.into_make_service()).await {
                error!("API服务器运行失败: {}", e);
            }
        });

        // 等待关闭信号
        let _ = shutdown_rx.recv().await;
        info!("应用收到关闭信号");

        server_handle.abort();
        if let Some(handle) = scheduler_handle {
            let _ = handle.await;
        }

        info!("应用已停止");
        Ok(())
    }

    /// 根据配置构造消息通道，令牌为空的通道不参与投递
    fn build_channels(&self) -> Vec<Arc<dyn MessageChannel>> {
        let mut channels: Vec<Arc<dyn MessageChannel>> = Vec::new();

        if !self.config.notifier.telegram.bot_token.is_empty() {
            info!("启用Telegram消息通道");
            channels.push(Arc::new(TelegramChannel::new(&self.config.notifier.telegram)));
        }
        if !self.config.notifier.discord.bot_token.is_empty() {
            info!("启用Discord消息通道");
            channels.push(Arc::new(DiscordChannel::new(&self.config.notifier.discord)));
        }

        channels
    }

    fn build_app_state(&self) -> Result<AppState> {
        let auth = &self.config.auth;
        let user_id = Uuid::parse_str(&auth.admin_user_id)
            .context("配置中的admin_user_id不是合法的UUID")?;

        Ok(AppState {
            todo_repo: Arc::clone(&self.todo_repo),
            jwt: Arc::new(JwtService::new(
                &auth.jwt_secret,
                auth.jwt_expiration_hours,
            )),
            admin: Arc::new(AdminCredentials {
                username: auth.admin_username.clone(),
                password: auth.admin_password.clone(),
                user_id,
            }),
        })
    }
}
