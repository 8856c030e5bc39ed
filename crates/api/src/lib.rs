//! HTTP API层
//!
//! 对外提供登录与待办事项的CRUD接口，提醒子系统不经过此层，
//! 二者只共享同一个仓储实例。

pub mod auth;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;

pub use routes::{create_app, AppState};
