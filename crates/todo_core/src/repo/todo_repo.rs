//! Todo repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert/get/list/delete (and completion toggle) over `todos`.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Each call is one statement on one connection; no cross-call transactions.
//! - List order is insertion order (`rowid ASC`).
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::todo::{Todo, TodoId, TodoValidationError};
use log::{debug, error, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard};

const TODO_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    completed
FROM todos";

const REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "title",
    "description",
    "completed",
    "created_at",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for todo persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TodoValidationError),
    /// Storage failure: connectivity, constraint violation or schema mismatch.
    Db(DbError),
    NotFound(TodoId),
    InvalidData(String),
    LockPoisoned,
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "todo not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted todo data: {message}"),
            Self::LockPoisoned => write!(f, "todo connection lock poisoned"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TodoValidationError> for RepoError {
    fn from(value: TodoValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for todo persistence.
///
/// Implementations must be safe to share between concurrent callers.
#[cfg_attr(test, mockall::automock)]
pub trait TodoRepository: Send + Sync {
    /// Persists a new todo. `item.id` must already be set.
    fn insert(&self, item: &Todo) -> RepoResult<()>;
    fn get(&self, id: &str) -> RepoResult<Todo>;
    /// Returns up to `limit` todos in insertion order.
    ///
    /// `limit <= 0` yields an empty list.
    fn list(&self, limit: i32, not_completed_only: bool) -> RepoResult<Vec<Todo>>;
    /// Hard-deletes a todo; `NotFound` when no row matches.
    fn delete(&self, id: &str) -> RepoResult<()>;
    fn set_completed(&self, id: &str, completed: bool) -> RepoResult<()>;
}

impl<T: TodoRepository + ?Sized> TodoRepository for &T {
    fn insert(&self, item: &Todo) -> RepoResult<()> {
        (**self).insert(item)
    }

    fn get(&self, id: &str) -> RepoResult<Todo> {
        (**self).get(id)
    }

    fn list(&self, limit: i32, not_completed_only: bool) -> RepoResult<Vec<Todo>> {
        (**self).list(limit, not_completed_only)
    }

    fn delete(&self, id: &str) -> RepoResult<()> {
        (**self).delete(id)
    }

    fn set_completed(&self, id: &str, completed: bool) -> RepoResult<()> {
        (**self).set_completed(id, completed)
    }
}

impl<T: TodoRepository + ?Sized> TodoRepository for Arc<T> {
    fn insert(&self, item: &Todo) -> RepoResult<()> {
        (**self).insert(item)
    }

    fn get(&self, id: &str) -> RepoResult<Todo> {
        (**self).get(id)
    }

    fn list(&self, limit: i32, not_completed_only: bool) -> RepoResult<Vec<Todo>> {
        (**self).list(limit, not_completed_only)
    }

    fn delete(&self, id: &str) -> RepoResult<()> {
        (**self).delete(id)
    }

    fn set_completed(&self, id: &str, completed: bool) -> RepoResult<()> {
        (**self).set_completed(id, completed)
    }
}

/// SQLite-backed todo repository.
///
/// Owns its connection behind a mutex so one instance can serve
/// concurrent callers; statements are serialized.
pub struct SqliteTodoRepository {
    conn: Mutex<Connection>,
}

impl SqliteTodoRepository {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version is not the latest.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when `todos` is
    ///   absent or incomplete.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        ensure_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Releases the underlying connection.
    pub fn into_inner(self) -> RepoResult<Connection> {
        self.conn.into_inner().map_err(|_| RepoError::LockPoisoned)
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| RepoError::LockPoisoned)
    }
}

impl TodoRepository for SqliteTodoRepository {
    fn insert(&self, item: &Todo) -> RepoResult<()> {
        let result = item
            .validate()
            .map_err(RepoError::from)
            .and_then(|()| self.lock())
            .and_then(|conn| {
                conn.execute(
                    "INSERT INTO todos (id, title, description, completed)
                     VALUES (?1, ?2, ?3, ?4);",
                    params![
                        item.id.as_str(),
                        item.title.as_str(),
                        item.description.as_str(),
                        item.completed,
                    ],
                )
                .map_err(RepoError::from)
            });

        log_outcome("todo_insert", &item.id, result).map(|_| ())
    }

    fn get(&self, id: &str) -> RepoResult<Todo> {
        let result = self.lock().and_then(|conn| {
            let todo = conn
                .query_row(
                    &format!("{TODO_SELECT_SQL} WHERE id = ?1;"),
                    [id],
                    |row| Ok(parse_todo_row(row)),
                )
                .optional()?;
            match todo {
                Some(parsed) => parsed,
                None => Err(RepoError::NotFound(id.to_string())),
            }
        });

        log_outcome("todo_get", id, result)
    }

    fn list(&self, limit: i32, not_completed_only: bool) -> RepoResult<Vec<Todo>> {
        if limit <= 0 {
            debug!("event=todo_list module=repo status=ok limit={limit} rows=0");
            return Ok(Vec::new());
        }

        let result = self
            .lock()
            .and_then(|conn| select_todos(&conn, limit, not_completed_only));
        match &result {
            Ok(todos) => debug!(
                "event=todo_list module=repo status=ok limit={limit} not_completed_only={not_completed_only} rows={}",
                todos.len()
            ),
            Err(err) => error!("event=todo_list module=repo status=error limit={limit} error={err}"),
        }
        result
    }

    fn delete(&self, id: &str) -> RepoResult<()> {
        let result = self.lock().and_then(|conn| {
            let changed = conn.execute("DELETE FROM todos WHERE id = ?1;", [id])?;
            if changed == 0 {
                return Err(RepoError::NotFound(id.to_string()));
            }
            Ok(())
        });

        log_outcome("todo_delete", id, result)
    }

    fn set_completed(&self, id: &str, completed: bool) -> RepoResult<()> {
        let result = self.lock().and_then(|conn| {
            let changed = conn.execute(
                "UPDATE todos
                 SET
                    completed = ?1,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?2;",
                params![completed, id],
            )?;
            if changed == 0 {
                return Err(RepoError::NotFound(id.to_string()));
            }
            Ok(())
        });

        log_outcome("todo_set_completed", id, result)
    }
}

fn log_outcome<T>(event: &str, id: &str, result: RepoResult<T>) -> RepoResult<T> {
    match &result {
        Ok(_) => debug!("event={event} module=repo status=ok id={id}"),
        Err(RepoError::NotFound(_)) => {
            warn!("event={event} module=repo status=error id={id} error_code=not_found")
        }
        Err(RepoError::Validation(err)) => {
            warn!("event={event} module=repo status=error id={id} error_code=validation error={err}")
        }
        Err(RepoError::Db(err)) if err.is_constraint_violation() => {
            warn!("event={event} module=repo status=error id={id} error_code=constraint_violation error={err}")
        }
        Err(err) => error!("event={event} module=repo status=error id={id} error={err}"),
    }
    result
}

fn select_todos(conn: &Connection, limit: i32, not_completed_only: bool) -> RepoResult<Vec<Todo>> {
    let mut stmt = conn.prepare(&format!(
        "{TODO_SELECT_SQL}
         WHERE (?1 = 0 OR completed = 0)
         ORDER BY rowid ASC
         LIMIT ?2;"
    ))?;

    let mut rows = stmt.query(params![not_completed_only, i64::from(limit)])?;
    let mut todos = Vec::new();
    while let Some(row) = rows.next()? {
        todos.push(parse_todo_row(row)?);
    }
    Ok(todos)
}

fn ensure_schema(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: bool = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'todos'
        );",
        [],
        |row| row.get(0),
    )?;
    if !table_exists {
        return Err(RepoError::MissingRequiredTable("todos"));
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('todos');")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    for &column in REQUIRED_COLUMNS {
        if !columns.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: "todos",
                column,
            });
        }
    }

    Ok(())
}

fn parse_todo_row(row: &Row<'_>) -> RepoResult<Todo> {
    let completed = match row.get::<_, i64>("completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid completed value `{other}` in todos.completed"
            )));
        }
    };

    let todo = Todo {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        completed,
    };
    todo.validate()
        .map_err(|err| RepoError::InvalidData(format!("todo `{}`: {err}", todo.id)))?;
    Ok(todo)
}
