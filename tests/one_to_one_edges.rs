mod support;

use goat_rust::{Entity, GraphError, StorageMode};
use serde_json::json;
use support::social::User;
use support::todo::{TodoItem, TodoList};
use support::{setup, user};

async fn list(db: &goat_rust::Database) -> Entity<TodoList> {
    let mut list = Entity::<TodoList>::create(db, Some(&user("alice"))).unwrap();
    list.save().await.unwrap();
    list
}

async fn person(db: &goat_rust::Database, name: &str) -> Entity<User> {
    let mut entity = Entity::<User>::create(db, None).unwrap();
    entity.set("name", name).unwrap();
    entity.save().await.unwrap();
    entity
}

// --- Table backed ---

#[tokio::test]
async fn adding_replaces_the_previous_target() {
    let (db, backend) = setup(StorageMode::SingleTable).await;
    let alice = user("alice");
    let mut list = list(&db).await;

    let mut first = Entity::<TodoItem>::create(&db, Some(&alice)).unwrap();
    let mut second = Entity::<TodoItem>::create(&db, Some(&alice)).unwrap();

    list.add_edge("pinned", &mut first).await.unwrap();
    list.add_edge("pinned", &mut second).await.unwrap();

    assert_eq!(backend.row_count("associations").unwrap(), 1);
    let pinned = list
        .query_edges::<TodoItem>("pinned")
        .unwrap()
        .first()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pinned.id(), second.id());
}

#[tokio::test]
async fn more_than_one_target_is_rejected() {
    let (db, backend) = setup(StorageMode::SingleTable).await;
    let alice = user("alice");
    let mut list = list(&db).await;

    let mut first = Entity::<TodoItem>::create(&db, Some(&alice)).unwrap();
    let mut second = Entity::<TodoItem>::create(&db, Some(&alice)).unwrap();

    let err = list
        .add_edges("pinned", &mut [&mut first, &mut second])
        .await
        .unwrap_err();

    assert!(matches!(err, GraphError::InvalidEdge(_)));
    assert_eq!(backend.row_count("associations").unwrap(), 0);
}

#[tokio::test]
async fn undirected_one_to_one_replaces_both_directions() {
    let (db, backend) = setup(StorageMode::SingleTable).await;

    let mut bob = person(&db, "bob").await;
    let mut carol = person(&db, "carol").await;
    let mut dave = person(&db, "dave").await;

    bob.add_edge("best_friend", &mut carol).await.unwrap();
    assert_eq!(backend.row_count("associations").unwrap(), 2);

    bob.add_edge("best_friend", &mut dave).await.unwrap();
    assert_eq!(backend.row_count("associations").unwrap(), 2);

    let bobs = bob.query_edges::<User>("best_friend").unwrap().await.unwrap();
    let daves = dave.query_edges::<User>("best_friend").unwrap().await.unwrap();
    assert_eq!(bobs.len(), 1);
    assert_eq!(bobs[0].id(), dave.id());
    assert_eq!(daves.len(), 1);
    assert_eq!(daves[0].id(), bob.id());
}

// --- Field backed ---

#[tokio::test]
async fn field_backed_edge_stores_the_target_id() {
    let (db, backend) = setup(StorageMode::SingleTable).await;
    let mut list = list(&db).await;
    let mut owner = person(&db, "owner").await;

    list.add_edge("owner", &mut owner).await.unwrap();

    assert_eq!(list.get("owner_id").unwrap(), &json!(owner.id()));
    assert!(!list.has_unsaved_changes());
    assert_eq!(backend.row_count("associations").unwrap(), 0);

    let found = list
        .query_edges::<User>("owner")
        .unwrap()
        .first()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id(), owner.id());

    let reloaded = Entity::<TodoList>::get_by_id(&db, list.id(), None).await.unwrap();
    assert_eq!(reloaded.get("owner_id").unwrap(), &json!(owner.id()));
}

#[tokio::test]
async fn field_backed_edge_with_null_field_is_empty() {
    let (db, _) = setup(StorageMode::SingleTable).await;
    let list = list(&db).await;

    let owners = list.query_edges::<User>("owner").unwrap().await.unwrap();

    assert!(owners.is_empty());
}

#[tokio::test]
async fn inverse_of_field_backed_edge_uses_the_index() {
    let (db, _) = setup(StorageMode::SingleTable).await;
    let mut owner = person(&db, "owner").await;
    let mut first = list(&db).await;
    let mut second = list(&db).await;
    let _unowned = list(&db).await;

    first.add_edge("owner", &mut owner).await.unwrap();
    second.add_edge("owner", &mut owner).await.unwrap();

    let owned = Entity::<TodoList>::query_inverse_of_edge(&db, "owner", &owner, None)
        .unwrap()
        .await
        .unwrap();
    let mut ids: Vec<&str> = owned.iter().map(|l| l.id()).collect();
    ids.sort();
    let mut expected = vec![first.id(), second.id()];
    expected.sort();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn inverse_of_unindexed_field_backed_edge_is_unsupported() {
    let (db, _) = setup(StorageMode::SingleTable).await;
    let reviewer = person(&db, "rev").await;

    let result = Entity::<TodoList>::query_inverse_of_edge(&db, "reviewer", &reviewer, None);

    assert!(matches!(result, Err(GraphError::UnsupportedQuery(_))));
}

#[tokio::test]
async fn deleting_a_field_backed_edge_clears_the_field() {
    let (db, _) = setup(StorageMode::SingleTable).await;
    let mut list = list(&db).await;
    let mut owner = person(&db, "owner").await;
    list.add_edge("owner", &mut owner).await.unwrap();

    // Not the current target: nothing happens.
    list.delete_edge("owner", "someone-else", false).await.unwrap();
    assert_eq!(list.get("owner_id").unwrap(), &json!(owner.id()));

    list.delete_edge("owner", &owner, false).await.unwrap();

    assert!(list.get("owner_id").unwrap().is_null());
    assert!(list.query_edges::<User>("owner").unwrap().await.unwrap().is_empty());
    assert!(Entity::<User>::query_by_id(&db, owner.id(), None).await.unwrap().is_some());
}

#[tokio::test]
async fn cascade_through_field_backed_edge_deletes_the_target() {
    let (db, backend) = setup(StorageMode::SingleTable).await;
    let mut list = list(&db).await;
    let mut owner = person(&db, "owner").await;
    list.add_edge("owner", &mut owner).await.unwrap();

    list.delete_edge("owner", owner.id(), true).await.unwrap();

    assert!(list.get("owner_id").unwrap().is_null());
    assert!(Entity::<User>::query_by_id(&db, owner.id(), None).await.unwrap().is_none());
    assert_eq!(backend.row_count("index__user__name").unwrap(), 0);
}
