//! Test data builders with sensible defaults

use chrono::{DateTime, Utc};
use uuid::Uuid;

use todo_domain::entities::Todo;

/// Builder for `Todo` test fixtures
pub struct TodoBuilder {
    todo: Todo,
}

impl TodoBuilder {
    pub fn new() -> Self {
        Self {
            todo: Todo::new(Uuid::new_v4(), "test_todo".to_string()),
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.todo.id = id;
        self
    }

    pub fn with_user_id(mut self, user_id: Uuid) -> Self {
        self.todo.user_id = user_id;
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.todo.title = title.to_string();
        self
    }

    pub fn with_priority(mut self, priority: &str) -> Self {
        self.todo.priority = priority.to_string();
        self
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.todo.due_date = Some(due_date);
        self
    }

    pub fn with_frequency_minutes(mut self, minutes: i64) -> Self {
        self.todo.notify_frequency_minutes = minutes;
        self
    }

    pub fn with_next_notify_at(mut self, at: DateTime<Utc>) -> Self {
        self.todo.next_notify_at = Some(at);
        self
    }

    pub fn completed(mut self) -> Self {
        self.todo.completed = true;
        self.todo.next_notify_at = None;
        self
    }

    pub fn notify_disabled(mut self) -> Self {
        self.todo.notify_enabled = false;
        self
    }

    pub fn telegram(mut self) -> Self {
        self.todo.telegram_enabled = true;
        self
    }

    pub fn discord(mut self) -> Self {
        self.todo.discord_enabled = true;
        self
    }

    pub fn build(self) -> Todo {
        self.todo
    }
}

impl Default for TodoBuilder {
    fn default() -> Self {
        Self::new()
    }
}
