//! Todo request/response service.
//!
//! # Responsibility
//! - Expose create/get/list/delete/complete entry points for core callers.
//! - Delegate persistence to an injected `TodoRepository`.
//!
//! # Invariants
//! - Each operation issues exactly one repository call.
//! - Repository errors are returned unchanged; nothing is retried.
//! - The service performs no validation of its own.

use crate::model::todo::{generate_id, Todo, TodoId};
use crate::repo::todo_repo::{RepoResult, TodoRepository};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreateTodoRequest {
    /// Item to persist. A blank `id` is replaced with a generated one.
    pub item: Todo,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreateTodoResponse {
    pub id: TodoId,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GetTodoRequest {
    pub id: TodoId,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GetTodoResponse {
    pub item: Todo,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListTodoRequest {
    /// Maximum number of items; `<= 0` returns nothing.
    pub limit: i32,
    /// Restrict to items with `completed == false`.
    pub not_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListTodoResponse {
    /// Items in insertion order.
    pub items: Vec<Todo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeleteTodoRequest {
    pub id: TodoId,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeleteTodoResponse {}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompleteTodoRequest {
    pub id: TodoId,
    /// Target completion state; `false` reopens the item.
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompleteTodoResponse {}

/// Service facade over a todo repository.
pub struct TodoService<R: TodoRepository> {
    repo: R,
}

impl<R: TodoRepository> TodoService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Persists `request.item` and returns its id.
    ///
    /// # Contract
    /// - Caller-supplied ids are passed through untouched.
    /// - A blank id is replaced with a generated UUID v4 before insert.
    pub fn create_todo(&self, request: &CreateTodoRequest) -> RepoResult<CreateTodoResponse> {
        let mut item = request.item.clone();
        if item.id.trim().is_empty() {
            item.id = generate_id();
        }

        self.repo.insert(&item)?;
        Ok(CreateTodoResponse { id: item.id })
    }

    pub fn get_todo(&self, request: &GetTodoRequest) -> RepoResult<GetTodoResponse> {
        let item = self.repo.get(&request.id)?;
        Ok(GetTodoResponse { item })
    }

    pub fn list_todo(&self, request: &ListTodoRequest) -> RepoResult<ListTodoResponse> {
        let items = self.repo.list(request.limit, request.not_completed)?;
        Ok(ListTodoResponse { items })
    }

    pub fn delete_todo(&self, request: &DeleteTodoRequest) -> RepoResult<DeleteTodoResponse> {
        self.repo.delete(&request.id)?;
        Ok(DeleteTodoResponse {})
    }

    /// Sets the completion state of one item.
    pub fn complete_todo(&self, request: &CompleteTodoRequest) -> RepoResult<CompleteTodoResponse> {
        self.repo.set_completed(&request.id, request.completed)?;
        Ok(CompleteTodoResponse {})
    }
}
