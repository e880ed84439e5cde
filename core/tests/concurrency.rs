//! Concurrent callers against one in-memory store.

use std::sync::Arc;

use todo_core::{CreateTodo, Field, ListParams, MemoryStore, TodoService, UpdateTodo};

fn create(text: &str, category: &str) -> CreateTodo {
    CreateTodo {
        text: text.to_string(),
        category: Some(category.to_string()),
        ..CreateTodo::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_and_deletes_keep_stats_consistent() {
    let svc = Arc::new(TodoService::new(MemoryStore::new()));

    let mut handles = Vec::new();
    for i in 0..40 {
        let svc = Arc::clone(&svc);
        handles.push(tokio::spawn(async move {
            let category = if i % 3 == 0 { "work" } else { "home" };
            let todo = svc.create(create(&format!("task {i}"), category)).await.unwrap();
            if i % 4 == 0 {
                svc.toggle_complete(&todo.id.to_string()).await.unwrap();
            }
            if i % 5 == 0 {
                svc.delete(&todo.id.to_string()).await.unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let stats = svc.stats().await.unwrap();
    let list = svc.list(&ListParams::default()).await.unwrap();
    assert_eq!(stats.total, list.count as u64);
    assert_eq!(stats.total, 32);
    assert_eq!(stats.pending, stats.total - stats.completed);
    assert_eq!(
        stats.by_category.iter().map(|g| g.count).sum::<u64>(),
        stats.total
    );
    assert!(stats
        .by_category
        .windows(2)
        .all(|pair| pair[0].count >= pair[1].count));
    assert!(list
        .data
        .windows(2)
        .all(|pair| pair[0].created_at >= pair[1].created_at));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_are_last_write_wins() {
    let svc = Arc::new(TodoService::new(MemoryStore::new()));
    let todo = svc.create(create("contended", "general")).await.unwrap();
    let id = todo.id.to_string();

    let mut handles = Vec::new();
    for i in 0..10 {
        let svc = Arc::clone(&svc);
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            let input = UpdateTodo {
                text: Field::Value(format!("writer {i}")),
                ..UpdateTodo::default()
            };
            svc.update(&id, input).await.unwrap()
        }));
    }
    let mut written = Vec::new();
    for handle in handles {
        written.push(handle.await.unwrap().text);
    }

    // Whatever survived was written in full by exactly one caller.
    let stored = svc.get_by_id(&id).await.unwrap();
    assert!(written.contains(&stored.text));
    assert!(stored.created_at <= stored.updated_at);
}
