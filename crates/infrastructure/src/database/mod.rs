pub mod sqlite_todo_repository;

pub use sqlite_todo_repository::SqliteTodoRepository;
