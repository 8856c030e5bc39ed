//! Shared test doubles for the todo reminder workspace
//!
//! Provides in-memory mock implementations and data builders so unit
//! and integration tests can run without a database or external
//! messaging services.

pub mod builders;
pub mod mocks;

pub use builders::TodoBuilder;
pub use mocks::{MockMessageChannel, MockTodoRepository};
