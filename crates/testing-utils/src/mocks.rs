//! Mock implementations of the repository and channel traits

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use todo_core::{TodoError, TodoResult};
use todo_domain::entities::{ChannelKind, ReorderEntry, Todo, TodoFilter};
use todo_domain::repositories::TodoRepository;
use todo_notifier::channels::MessageChannel;

/// In-memory mock of `TodoRepository` with injectable failures
#[derive(Clone, Default)]
pub struct MockTodoRepository {
    todos: Arc<Mutex<HashMap<Uuid, Todo>>>,
    fail_loads: Arc<AtomicBool>,
    fail_saves: Arc<AtomicBool>,
}

impl MockTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_todos(todos: Vec<Todo>) -> Self {
        let repo = Self::new();
        {
            let mut map = repo.todos.lock().unwrap();
            for todo in todos {
                map.insert(todo.id, todo);
            }
        }
        repo
    }

    /// Make `find_notify_eligible` fail until cleared
    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    /// Make `save_notification_state` fail until cleared
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn get(&self, id: Uuid) -> Option<Todo> {
        self.todos.lock().unwrap().get(&id).cloned()
    }

    pub fn count(&self) -> usize {
        self.todos.lock().unwrap().len()
    }
}

#[async_trait]
impl TodoRepository for MockTodoRepository {
    async fn create(&self, todo: &Todo) -> TodoResult<Todo> {
        let mut todos = self.todos.lock().unwrap();
        let duplicate = todos
            .values()
            .any(|t| t.user_id == todo.user_id && t.title == todo.title);
        if duplicate {
            return Err(TodoError::DuplicateTitle {
                title: todo.title.clone(),
            });
        }
        todos.insert(todo.id, todo.clone());
        Ok(todo.clone())
    }

    async fn find_by_id(&self, id: Uuid, user_id: Uuid) -> TodoResult<Option<Todo>> {
        let todos = self.todos.lock().unwrap();
        Ok(todos
            .get(&id)
            .filter(|t| t.user_id == user_id)
            .cloned())
    }

    async fn list_for_user(&self, user_id: Uuid, filter: &TodoFilter) -> TodoResult<Vec<Todo>> {
        let todos = self.todos.lock().unwrap();
        let mut result: Vec<Todo> = todos
            .values()
            .filter(|t| t.user_id == user_id)
            .filter(|t| {
                filter
                    .priority
                    .as_ref()
                    .is_none_or(|p| &t.priority == p)
            })
            .filter(|t| filter.completed.is_none_or(|c| t.completed == c))
            .filter(|t| {
                filter
                    .due_before
                    .is_none_or(|cutoff| t.due_date.is_some_and(|d| d <= cutoff))
            })
            .cloned()
            .collect();
        result.sort_by_key(|t| (t.order_index, t.due_date));
        Ok(result)
    }

    async fn update(&self, todo: &Todo) -> TodoResult<Todo> {
        let mut todos = self.todos.lock().unwrap();
        if !todos.contains_key(&todo.id) {
            return Err(TodoError::TodoNotFound { id: todo.id });
        }
        todos.insert(todo.id, todo.clone());
        Ok(todo.clone())
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> TodoResult<bool> {
        let mut todos = self.todos.lock().unwrap();
        let matches = todos
            .get(&id)
            .is_some_and(|t| t.user_id == user_id);
        if matches {
            todos.remove(&id);
        }
        Ok(matches)
    }

    async fn mark_completed(
        &self,
        id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> TodoResult<Option<Todo>> {
        let mut todos = self.todos.lock().unwrap();
        match todos.get_mut(&id).filter(|t| t.user_id == user_id) {
            Some(todo) => {
                todo.mark_completed(now);
                Ok(Some(todo.clone()))
            }
            None => Ok(None),
        }
    }

    async fn reorder(&self, user_id: Uuid, entries: &[ReorderEntry]) -> TodoResult<()> {
        let mut todos = self.todos.lock().unwrap();
        for entry in entries {
            if let Some(todo) = todos.get_mut(&entry.id).filter(|t| t.user_id == user_id) {
                todo.order_index = entry.index;
            }
        }
        Ok(())
    }

    async fn find_notify_eligible(&self) -> TodoResult<Vec<Todo>> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(TodoError::Internal("simulated load failure".to_string()));
        }
        let todos = self.todos.lock().unwrap();
        Ok(todos
            .values()
            .filter(|t| t.is_notify_eligible())
            .cloned()
            .collect())
    }

    async fn save_notification_state(&self, todo: &Todo) -> TodoResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(TodoError::Internal("simulated save failure".to_string()));
        }
        let mut todos = self.todos.lock().unwrap();
        if let Some(stored) = todos.get_mut(&todo.id) {
            stored.next_notify_at = todo.next_notify_at;
        }
        Ok(())
    }
}

/// Recording mock of `MessageChannel`, optionally failing every send
pub struct MockMessageChannel {
    kind: ChannelKind,
    sent: Arc<Mutex<Vec<String>>>,
    fail: Arc<AtomicBool>,
}

impl MockMessageChannel {
    pub fn new(kind: ChannelKind) -> Self {
        Self {
            kind,
            sent: Arc::new(Mutex::new(Vec::new())),
            fail: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn failing(kind: ChannelKind) -> Self {
        let channel = Self::new(kind);
        channel.fail.store(true, Ordering::SeqCst);
        channel
    }

    pub fn sent_messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageChannel for MockMessageChannel {
    fn kind(&self) -> ChannelKind {
        self.kind
    }

    async fn send_direct_message(&self, text: &str) -> TodoResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(TodoError::Channel {
                channel: self.kind.as_str(),
                message: "simulated transport failure".to_string(),
            });
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}
