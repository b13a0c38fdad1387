//! Core of the todo service: SQLite persistence plus a thin
//! request/response service layer.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::todo::{generate_id, Todo, TodoId, TodoValidationError};
pub use repo::todo_repo::{RepoError, RepoResult, SqliteTodoRepository, TodoRepository};
pub use service::todo_service::{
    CompleteTodoRequest, CompleteTodoResponse, CreateTodoRequest, CreateTodoResponse,
    DeleteTodoRequest, DeleteTodoResponse, GetTodoRequest, GetTodoResponse, ListTodoRequest,
    ListTodoResponse, TodoService,
};
