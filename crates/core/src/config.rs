use std::path::Path;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::errors::{TodoError, TodoResult};

/// 应用配置
///
/// 配置来源优先级（从低到高）：serde默认值、TOML配置文件、
/// `TODO__` 前缀的环境变量（如 `TODO__API__BIND_ADDRESS`）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite数据库路径，如 `sqlite://todos.db`
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://todos.db".to_string(),
            max_connections: 5,
            min_connections: 1,
            connection_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub bind_address: String,
    pub cors_enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            cors_enabled: true,
        }
    }
}

/// 认证配置
///
/// 仅支持单个管理员账号，凭据与JWT密钥应通过环境变量注入。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub admin_username: String,
    pub admin_password: String,
    /// 管理员用户ID（UUID字符串），登录后写入JWT的sub字段
    pub admin_user_id: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_expiration_hours: 24,
            admin_username: String::new(),
            admin_password: String::new(),
            admin_user_id: String::new(),
        }
    }
}

/// 提醒调度配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    pub enabled: bool,
    /// 扫描间隔，生产环境默认1分钟
    pub scan_interval_seconds: u64,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            scan_interval_seconds: 60,
            telegram: TelegramConfig::default(),
            discord: DiscordConfig::default(),
        }
    }
}

/// Telegram通道配置，bot_token为空时不启用该通道
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    /// 接收提醒的chat id，进程级固定目的地
    #[serde(default)]
    pub owner_chat_id: String,
}

/// Discord通道配置，bot_token为空时不启用该通道
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(default)]
    pub bot_token: String,
    /// 接收提醒的用户id，进程级固定目的地
    #[serde(default)]
    pub owner_user_id: String,
}

impl AppConfig {
    pub fn load(config_path: Option<&str>) -> TodoResult<Self> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(TodoError::Configuration(format!("配置文件不存在: {path}")));
            }
        } else {
            let default_paths = ["config/todo-reminder.toml", "todo-reminder.toml"];
            for path in &default_paths {
                if Path::new(path).exists() {
                    builder = builder.add_source(File::new(path, FileFormat::Toml));
                    break;
                }
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("TODO")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .map_err(|e| TodoError::Configuration(format!("构建配置失败: {e}")))?
            .try_deserialize()
            .map_err(|e| TodoError::Configuration(format!("反序列化配置失败: {e}")))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> TodoResult<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(TodoError::Configuration(
                "auth.jwt_secret 不能为空".to_string(),
            ));
        }
        if self.auth.admin_username.is_empty() || self.auth.admin_password.is_empty() {
            return Err(TodoError::Configuration(
                "auth.admin_username/admin_password 不能为空".to_string(),
            ));
        }
        if uuid::Uuid::parse_str(&self.auth.admin_user_id).is_err() {
            return Err(TodoError::Configuration(format!(
                "auth.admin_user_id 不是有效的UUID: {}",
                self.auth.admin_user_id
            )));
        }
        if self.notifier.scan_interval_seconds == 0 {
            return Err(TodoError::Configuration(
                "notifier.scan_interval_seconds 必须大于0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        AppConfig {
            database: DatabaseConfig::default(),
            api: ApiConfig::default(),
            auth: AuthConfig {
                jwt_secret: "test-secret".to_string(),
                jwt_expiration_hours: 24,
                admin_username: "admin".to_string(),
                admin_password: "password".to_string(),
                admin_user_id: "4b8c3a48-6a86-4b9c-8f0e-2b6a7a3f9d11".to_string(),
            },
            notifier: NotifierConfig::default(),
        }
    }

    #[test]
    fn test_valid_config_passes_validation() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_missing_jwt_secret_rejected() {
        let mut config = valid_config();
        config.auth.jwt_secret.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_admin_user_id_rejected() {
        let mut config = valid_config();
        config.auth.admin_user_id = "not-a-uuid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_scan_interval_rejected() {
        let mut config = valid_config();
        config.notifier.scan_interval_seconds = 0;
        assert!(config.validate().is_err());
    }
}
