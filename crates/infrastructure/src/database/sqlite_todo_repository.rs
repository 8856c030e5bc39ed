use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use todo_core::{TodoError, TodoResult};
use todo_domain::{
    entities::{ReorderEntry, Todo, TodoFilter},
    repositories::TodoRepository,
};

const SELECT_COLUMNS: &str = "id, user_id, title, description, due_date, priority, completed, \
     notify_enabled, notify_frequency_minutes, order_index, telegram_enabled, discord_enabled, \
     next_notify_at, created_at, updated_at";

pub struct SqliteTodoRepository {
    pool: SqlitePool,
}

impl SqliteTodoRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 创建嵌入式SQLite仓储，自动初始化数据库
    pub async fn new_embedded(database_url: &str) -> TodoResult<Self> {
        use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
        use std::str::FromStr;

        debug!("Creating embedded SQLite todo repository at: {}", database_url);

        // 启用外键约束和WAL模式
        let connect_options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .min_connections(1)
            .connect_with(connect_options)
            .await?;

        Self::run_migrations(&pool).await?;

        debug!("Successfully created embedded SQLite todo repository");
        Ok(Self { pool })
    }

    /// 运行数据库迁移
    pub async fn run_migrations(pool: &SqlitePool) -> TodoResult<()> {
        debug!("Running SQLite database migrations");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS todos (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                due_date DATETIME,
                priority TEXT NOT NULL DEFAULT 'medium',
                completed INTEGER NOT NULL DEFAULT 0,
                notify_enabled INTEGER NOT NULL DEFAULT 1,
                notify_frequency_minutes INTEGER NOT NULL DEFAULT 60,
                order_index INTEGER NOT NULL DEFAULT 0,
                telegram_enabled INTEGER NOT NULL DEFAULT 0,
                discord_enabled INTEGER NOT NULL DEFAULT 0,
                next_notify_at DATETIME,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                UNIQUE (user_id, title)
            )
            "#,
        )
        .execute(pool)
        .await?;

        let indexes = [
            "CREATE INDEX IF NOT EXISTS idx_todos_user_id ON todos(user_id)",
            "CREATE INDEX IF NOT EXISTS idx_todos_order_index ON todos(order_index)",
            "CREATE INDEX IF NOT EXISTS idx_todos_notify ON todos(notify_enabled, completed)",
        ];
        for index_sql in indexes {
            sqlx::query(index_sql).execute(pool).await?;
        }

        Ok(())
    }

    fn map_row(row: &SqliteRow) -> TodoResult<Todo> {
        Ok(Todo {
            id: parse_uuid(&row.try_get::<String, _>("id")?)?,
            user_id: parse_uuid(&row.try_get::<String, _>("user_id")?)?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            due_date: row.try_get::<Option<DateTime<Utc>>, _>("due_date")?,
            priority: row.try_get("priority")?,
            completed: row.try_get("completed")?,
            notify_enabled: row.try_get("notify_enabled")?,
            notify_frequency_minutes: row.try_get("notify_frequency_minutes")?,
            order_index: row.try_get("order_index")?,
            telegram_enabled: row.try_get("telegram_enabled")?,
            discord_enabled: row.try_get("discord_enabled")?,
            next_notify_at: row.try_get::<Option<DateTime<Utc>>, _>("next_notify_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

fn parse_uuid(value: &str) -> TodoResult<Uuid> {
    Uuid::parse_str(value).map_err(|e| TodoError::Serialization(format!("无效的UUID {value}: {e}")))
}

#[async_trait]
impl TodoRepository for SqliteTodoRepository {
    async fn create(&self, todo: &Todo) -> TodoResult<Todo> {
        sqlx::query(
            r#"
            INSERT INTO todos (
                id, user_id, title, description, due_date, priority, completed,
                notify_enabled, notify_frequency_minutes, order_index,
                telegram_enabled, discord_enabled, next_notify_at, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
        )
        .bind(todo.id.to_string())
        .bind(todo.user_id.to_string())
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.due_date)
        .bind(&todo.priority)
        .bind(todo.completed)
        .bind(todo.notify_enabled)
        .bind(todo.notify_frequency_minutes)
        .bind(todo.order_index)
        .bind(todo.telegram_enabled)
        .bind(todo.discord_enabled)
        .bind(todo.next_notify_at)
        .bind(todo.created_at)
        .bind(todo.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => TodoError::DuplicateTitle {
                title: todo.title.clone(),
            },
            _ => TodoError::Database(e),
        })?;

        Ok(todo.clone())
    }

    async fn find_by_id(&self, id: Uuid, user_id: Uuid) -> TodoResult<Option<Todo>> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM todos WHERE id = ?1 AND user_id = ?2"
        ))
        .bind(id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn list_for_user(&self, user_id: Uuid, filter: &TodoFilter) -> TodoResult<Vec<Todo>> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {SELECT_COLUMNS} FROM todos WHERE user_id = "));
        builder.push_bind(user_id.to_string());

        if let Some(priority) = &filter.priority {
            builder.push(" AND priority = ");
            builder.push_bind(priority.clone());
        }
        if let Some(completed) = filter.completed {
            builder.push(" AND completed = ");
            builder.push_bind(completed);
        }
        if let Some(due_before) = filter.due_before {
            builder.push(" AND due_date <= ");
            builder.push_bind(due_before);
        }
        builder.push(" ORDER BY order_index ASC, due_date ASC");

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(Self::map_row).collect()
    }

    async fn update(&self, todo: &Todo) -> TodoResult<Todo> {
        let result = sqlx::query(
            r#"
            UPDATE todos SET
                title = ?1, description = ?2, due_date = ?3, priority = ?4,
                completed = ?5, notify_enabled = ?6, notify_frequency_minutes = ?7,
                order_index = ?8, telegram_enabled = ?9, discord_enabled = ?10,
                next_notify_at = ?11, updated_at = ?12
            WHERE id = ?13 AND user_id = ?14
            "#,
        )
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.due_date)
        .bind(&todo.priority)
        .bind(todo.completed)
        .bind(todo.notify_enabled)
        .bind(todo.notify_frequency_minutes)
        .bind(todo.order_index)
        .bind(todo.telegram_enabled)
        .bind(todo.discord_enabled)
        .bind(todo.next_notify_at)
        .bind(todo.updated_at)
        .bind(todo.id.to_string())
        .bind(todo.user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => TodoError::DuplicateTitle {
                title: todo.title.clone(),
            },
            _ => TodoError::Database(e),
        })?;

        if result.rows_affected() == 0 {
            return Err(TodoError::TodoNotFound { id: todo.id });
        }
        Ok(todo.clone())
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> TodoResult<bool> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?1 AND user_id = ?2")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_completed(
        &self,
        id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> TodoResult<Option<Todo>> {
        // 完成与清空定时器必须落在同一次写入，保证完成态不变式
        let result = sqlx::query(
            "UPDATE todos SET completed = 1, next_notify_at = NULL, updated_at = ?1 \
             WHERE id = ?2 AND user_id = ?3",
        )
        .bind(now)
        .bind(id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id, user_id).await
    }

    async fn reorder(&self, user_id: Uuid, entries: &[ReorderEntry]) -> TodoResult<()> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        for entry in entries {
            sqlx::query(
                "UPDATE todos SET order_index = ?1, updated_at = ?2 \
                 WHERE id = ?3 AND user_id = ?4",
            )
            .bind(entry.index)
            .bind(now)
            .bind(entry.id.to_string())
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn find_notify_eligible(&self) -> TodoResult<Vec<Todo>> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM todos \
             WHERE notify_enabled = 1 AND completed = 0"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::map_row).collect()
    }

    async fn save_notification_state(&self, todo: &Todo) -> TodoResult<()> {
        sqlx::query("UPDATE todos SET next_notify_at = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(todo.next_notify_at)
            .bind(Utc::now())
            .bind(todo.id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
