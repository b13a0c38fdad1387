use std::sync::Arc;
use std::thread;
use todo_core::db::open_db_in_memory;
use todo_core::{
    CompleteTodoRequest, CreateTodoRequest, DeleteTodoRequest, GetTodoRequest, ListTodoRequest,
    RepoError, SqliteTodoRepository, Todo, TodoService,
};

fn service() -> TodoService<SqliteTodoRepository> {
    let repo = SqliteTodoRepository::try_new(open_db_in_memory().unwrap()).unwrap();
    TodoService::new(repo)
}

#[test]
fn create_get_list_delete_flow() {
    let service = service();

    let a = service
        .create_todo(&CreateTodoRequest {
            item: Todo::with_id("a", "x", ""),
        })
        .unwrap();
    let b = service
        .create_todo(&CreateTodoRequest {
            item: Todo::with_id("b", "y", ""),
        })
        .unwrap();
    assert_eq!(a.id, "a");
    assert_eq!(b.id, "b");

    let listed = service
        .list_todo(&ListTodoRequest {
            limit: 2,
            not_completed: false,
        })
        .unwrap();
    assert_eq!(
        listed.items,
        vec![Todo::with_id("a", "x", ""), Todo::with_id("b", "y", "")]
    );

    service
        .delete_todo(&DeleteTodoRequest {
            id: "a".to_string(),
        })
        .unwrap();

    let err = service
        .get_todo(&GetTodoRequest {
            id: "a".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == "a"));
}

#[test]
fn create_without_id_assigns_one_that_get_resolves() {
    let service = service();

    let created = service
        .create_todo(&CreateTodoRequest {
            item: Todo::with_id("", "Star Platinum", "The World"),
        })
        .unwrap();
    assert!(!created.id.is_empty());

    let fetched = service
        .get_todo(&GetTodoRequest {
            id: created.id.clone(),
        })
        .unwrap();
    assert_eq!(fetched.item.id, created.id);
    assert_eq!(fetched.item.title, "Star Platinum");
    assert_eq!(fetched.item.description, "The World");
    assert!(!fetched.item.completed);
}

#[test]
fn complete_todo_hides_item_from_not_completed_list() {
    let service = service();
    for (id, title) in [("1", "one"), ("2", "two")] {
        service
            .create_todo(&CreateTodoRequest {
                item: Todo::with_id(id, title, ""),
            })
            .unwrap();
    }

    service
        .complete_todo(&CompleteTodoRequest {
            id: "1".to_string(),
            completed: true,
        })
        .unwrap();

    let open = service
        .list_todo(&ListTodoRequest {
            limit: 10,
            not_completed: true,
        })
        .unwrap();
    assert_eq!(open.items, vec![Todo::with_id("2", "two", "")]);
}

#[test]
fn validation_errors_surface_through_service() {
    let service = service();

    let err = service
        .create_todo(&CreateTodoRequest {
            item: Todo::with_id("id", "   ", ""),
        })
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn shared_repository_serves_concurrent_callers() {
    let repo = Arc::new(SqliteTodoRepository::try_new(open_db_in_memory().unwrap()).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let service = TodoService::new(Arc::clone(&repo));
            thread::spawn(move || {
                for n in 0..5 {
                    service
                        .create_todo(&CreateTodoRequest {
                            item: Todo::with_id(format!("w{worker}-{n}"), "task", ""),
                        })
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let service = TodoService::new(&*repo);
    let all = service
        .list_todo(&ListTodoRequest {
            limit: 100,
            not_completed: false,
        })
        .unwrap();
    assert_eq!(all.items.len(), 40);
}
