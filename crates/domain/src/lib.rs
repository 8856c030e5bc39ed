pub mod entities;
pub mod repositories;

pub use entities::{ChannelKind, ReorderEntry, Todo, TodoFilter};
pub use repositories::TodoRepository;
