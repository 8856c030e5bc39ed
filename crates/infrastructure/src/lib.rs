pub mod database;

pub use database::SqliteTodoRepository;
