//! Command-line entry point for the todo store.
//!
//! # Responsibility
//! - Wire `todo_core` to a database file chosen by flag or environment.
//! - Print service responses as JSON.

use clap::{Parser, Subcommand};
use log::info;
use std::error::Error;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use todo_core::{
    default_log_level, init_logging, open_db, CompleteTodoRequest, CreateTodoRequest,
    DeleteTodoRequest, GetTodoRequest, ListTodoRequest, SqliteTodoRepository, Todo, TodoService,
};

const DEFAULT_DB_FILE: &str = "todo.sqlite3";
const DEFAULT_LIST_LIMIT: i32 = 20;

#[derive(Parser)]
#[command(name = "todo")]
#[command(version, about = "Manage todo items in a SQLite store", long_about = None)]
struct Cli {
    /// Database file (created and migrated on first use)
    #[arg(long, global = true, env = "TODO_DB_PATH", default_value = DEFAULT_DB_FILE)]
    db: PathBuf,

    /// trace|debug|info|warn|error; defaults to debug in debug builds, info otherwise
    #[arg(long, global = true, env = "TODO_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rotating log files; logging is off when unset
    #[arg(long, global = true, env = "TODO_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a todo and print its id
    Create {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Explicit id; a UUID is generated when omitted
        #[arg(long)]
        id: Option<String>,
    },
    /// Show one todo
    Get { id: String },
    /// List todos in insertion order
    List {
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: i32,
        /// Only show todos that are not completed
        #[arg(long)]
        not_completed: bool,
    },
    /// Delete a todo
    Delete { id: String },
    /// Mark a todo as completed
    Complete {
        id: String,
        /// Reopen instead of completing
        #[arg(long)]
        undo: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = run(cli);
    let code = finish(result, &mut std::io::stdout(), &mut std::io::stderr());
    ExitCode::from(code)
}

/// Writes the outcome to `out` or `err` and returns the process exit status.
fn finish(
    result: Result<String, Box<dyn Error>>,
    out: &mut impl Write,
    err: &mut impl Write,
) -> u8 {
    match result {
        Ok(output) => {
            let _ = writeln!(out, "{output}");
            0
        }
        Err(error) => {
            let _ = writeln!(err, "error: {error}");
            1
        }
    }
}

fn run(cli: Cli) -> Result<String, Box<dyn Error>> {
    if let Some(log_dir) = &cli.log_dir {
        let level = cli
            .log_level
            .clone()
            .unwrap_or_else(|| default_log_level().to_string());
        init_logging(&level, log_dir)?;
    }

    let conn = open_db(&cli.db)?;
    let service = TodoService::new(SqliteTodoRepository::try_new(conn)?);
    info!("event=cli_command module=cli status=start db={}", cli.db.display());

    let output = match cli.command {
        Command::Create {
            title,
            description,
            id,
        } => {
            let item = Todo::with_id(id.unwrap_or_default(), title, description);
            serde_json::to_string_pretty(&service.create_todo(&CreateTodoRequest { item })?)?
        }
        Command::Get { id } => {
            serde_json::to_string_pretty(&service.get_todo(&GetTodoRequest { id })?)?
        }
        Command::List {
            limit,
            not_completed,
        } => serde_json::to_string_pretty(&service.list_todo(&ListTodoRequest {
            limit,
            not_completed,
        })?)?,
        Command::Delete { id } => {
            serde_json::to_string_pretty(&service.delete_todo(&DeleteTodoRequest { id })?)?
        }
        Command::Complete { id, undo } => {
            serde_json::to_string_pretty(&service.complete_todo(&CompleteTodoRequest {
                id,
                completed: !undo,
            })?)?
        }
    };

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::{finish, run, Cli, Command, DEFAULT_DB_FILE, DEFAULT_LIST_LIMIT};
    use clap::{CommandFactory, Parser};
    use serial_test::serial;
    use std::path::{Path, PathBuf};

    fn parse(db: &Path, args: &[&str]) -> Cli {
        let db = db.to_str().unwrap();
        let mut argv = vec!["todo", "--db", db];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    #[serial]
    fn list_defaults_apply() {
        let cli = Cli::try_parse_from(["todo", "--db", "x.sqlite3", "list"]).unwrap();
        match cli.command {
            Command::List {
                limit,
                not_completed,
            } => {
                assert_eq!(limit, DEFAULT_LIST_LIMIT);
                assert!(!not_completed);
            }
            _ => panic!("expected list command"),
        }
    }

    #[test]
    #[serial]
    fn complete_accepts_undo_flag() {
        let cli = Cli::try_parse_from(["todo", "complete", "abc", "--undo"]).unwrap();
        assert!(matches!(cli.command, Command::Complete { ref id, undo: true } if id == "abc"));
    }

    #[test]
    #[serial]
    fn db_path_falls_back_to_env_then_default_file() {
        std::env::set_var("TODO_DB_PATH", "/tmp/from-env.sqlite3");
        let cli = Cli::try_parse_from(["todo", "list"]).unwrap();
        assert_eq!(cli.db, PathBuf::from("/tmp/from-env.sqlite3"));

        let cli = Cli::try_parse_from(["todo", "--db", "flag.sqlite3", "list"]).unwrap();
        assert_eq!(cli.db, PathBuf::from("flag.sqlite3"));

        std::env::remove_var("TODO_DB_PATH");
        let cli = Cli::try_parse_from(["todo", "list"]).unwrap();
        assert_eq!(cli.db, PathBuf::from(DEFAULT_DB_FILE));
    }

    #[test]
    #[serial]
    fn run_create_get_delete_prints_json_and_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("todo.sqlite3");

        let created =
            run(parse(&db, &["create", "x", "--id", "a", "--description", "d"])).unwrap();
        let created: serde_json::Value = serde_json::from_str(&created).unwrap();
        assert_eq!(created, serde_json::json!({ "id": "a" }));

        let fetched = run(parse(&db, &["get", "a"])).unwrap();
        let keys: Vec<_> = ["\"id\"", "\"title\"", "\"description\"", "\"completed\""]
            .iter()
            .map(|key| fetched.find(*key).unwrap())
            .collect();
        assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
        let fetched: serde_json::Value = serde_json::from_str(&fetched).unwrap();
        assert_eq!(
            fetched,
            serde_json::json!({
                "item": { "id": "a", "title": "x", "description": "d", "completed": false }
            })
        );

        let deleted = run(parse(&db, &["delete", "a"])).unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&deleted).unwrap(),
            serde_json::json!({})
        );

        let err = run(parse(&db, &["delete", "a"])).unwrap_err();
        assert_eq!(err.to_string(), "todo not found: a");
    }

    #[test]
    #[serial]
    fn run_list_not_completed_skips_completed_items() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("todo.sqlite3");

        run(parse(&db, &["create", "x", "--id", "a"])).unwrap();
        run(parse(&db, &["create", "y"])).unwrap();
        run(parse(&db, &["complete", "a"])).unwrap();

        let listed = run(parse(&db, &["list", "--not-completed"])).unwrap();
        let listed: serde_json::Value = serde_json::from_str(&listed).unwrap();
        let items = listed["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["title"], "y");
    }

    #[test]
    fn finish_writes_errors_to_stderr_with_exit_code_one() {
        let mut out = Vec::new();
        let mut err = Vec::new();

        let code = finish(Err("todo not found: a".into()), &mut out, &mut err);

        assert_eq!(code, 1);
        assert!(out.is_empty());
        assert_eq!(String::from_utf8(err).unwrap(), "error: todo not found: a\n");
    }

    #[test]
    fn finish_writes_output_to_stdout_with_exit_code_zero() {
        let mut out = Vec::new();
        let mut err = Vec::new();

        let code = finish(Ok("{}".to_string()), &mut out, &mut err);

        assert_eq!(code, 0);
        assert_eq!(String::from_utf8(out).unwrap(), "{}\n");
        assert!(err.is_empty());
    }
}
