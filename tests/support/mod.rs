#![allow(dead_code)]

pub mod notes;
pub mod social;
pub mod todo;

use std::sync::Arc;

use goat_rust::{Database, DatabaseConfig, InMemoryBackend, StorageMode, Viewer};

/// A ready database over a fresh in-memory backend with every fixture type registered.
pub async fn setup(mode: StorageMode) -> (Database, InMemoryBackend) {
    let backend = InMemoryBackend::new();
    let config = DatabaseConfig {
        storage_mode: mode,
        install_log_subscriber: false,
        ..DatabaseConfig::default()
    };

    let db = Database::builder(Arc::new(backend.clone()))
        .config(config)
        .register::<todo::TodoItem>()
        .register::<todo::PrivateTodoItem>()
        .register::<todo::ReadonlyTodoItem>()
        .register::<todo::TodoList>()
        .register::<social::User>()
        .register::<notes::Note>()
        .register::<notes::GuardedNote>()
        .build()
        .expect("fixture types register");
    db.initialise().await.expect("database initialises");
    (db, backend)
}

pub fn user(id: &str) -> Viewer {
    Viewer::logged_in(id, Vec::<String>::new())
}
