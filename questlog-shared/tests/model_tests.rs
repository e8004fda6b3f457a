/// Integration tests for the entity models
///
/// These run against a throwaway in-memory SQLite store with the real
/// schema applied, so foreign-key cascade and the edited_at triggers are
/// exercised for real.

use questlog_shared::db::migrations::run_migrations;
use questlog_shared::db::pool::{create_pool, StoreConfig};
use questlog_shared::models::attribute::{Attribute, CreateAttribute, UpdateAttribute};
use questlog_shared::models::task::{CreateTask, Task, UpdateTask};
use questlog_shared::models::user::{CreateUser, UpdateUser, User};
use questlog_shared::models::ModelError;
use sqlx::SqlitePool;

/// In-memory store; a single connection so every query sees the same db
async fn test_pool() -> SqlitePool {
    let pool = create_pool(StoreConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        ..Default::default()
    })
    .await
    .expect("failed to create in-memory pool");

    run_migrations(&pool).await.expect("failed to run migrations");
    pool
}

fn alice() -> CreateUser {
    CreateUser {
        name: "Alice".to_string(),
        level: 1,
        experience: 0,
        rank: "novice".to_string(),
    }
}

fn strength() -> CreateAttribute {
    CreateAttribute {
        name: "Strength".to_string(),
        level: 1,
        experience: 10,
    }
}

async fn task_count(pool: &SqlitePool) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks")
        .fetch_one(pool)
        .await
        .expect("count query failed");
    count
}

async fn raw_task_ids(pool: &SqlitePool, user_id: i64) -> String {
    let (task_ids,): (String,) = sqlx::query_as("SELECT task_ids FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("task_ids query failed");
    task_ids
}

#[tokio::test]
async fn test_attribute_create_then_find_returns_input() {
    let pool = test_pool().await;

    let id = Attribute::create(&pool, strength()).await.unwrap();
    let attribute = Attribute::find_by_id(&pool, id).await.unwrap();

    assert_eq!(attribute.id, id);
    assert_eq!(attribute.name, "Strength");
    assert_eq!(attribute.level, 1);
    assert_eq!(attribute.experience, 10);
}

#[tokio::test]
async fn test_attribute_create_rejects_invalid_input() {
    let pool = test_pool().await;

    let result = Attribute::create(
        &pool,
        CreateAttribute {
            name: "  ".to_string(),
            level: 1,
            experience: 10,
        },
    )
    .await;
    assert!(matches!(result, Err(ModelError::Validation(_))));

    let result = Attribute::create(
        &pool,
        CreateAttribute {
            name: "Strength".to_string(),
            level: 0,
            experience: 10,
        },
    )
    .await;
    assert!(matches!(result, Err(ModelError::Validation(_))));

    let attributes = Attribute::find_all(&pool).await.unwrap();
    assert!(attributes.is_empty());
}

#[tokio::test]
async fn test_attribute_partial_update_leaves_other_fields() {
    let pool = test_pool().await;
    let id = Attribute::create(&pool, strength()).await.unwrap();
    let before = Attribute::find_by_id(&pool, id).await.unwrap();

    // CURRENT_TIMESTAMP has second resolution; cross the boundary so the
    // trigger's refresh is observable.
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

    let affected = Attribute::update(
        &pool,
        id,
        UpdateAttribute {
            level: Some(3),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(affected, 1);

    let after = Attribute::find_by_id(&pool, id).await.unwrap();
    assert_eq!(after.level, 3);
    assert_eq!(after.name, before.name);
    assert_eq!(after.experience, before.experience);
    assert_eq!(after.created_at, before.created_at);
    assert!(after.edited_at > before.edited_at);
}

#[tokio::test]
async fn test_attribute_update_unknown_id_is_not_found() {
    let pool = test_pool().await;

    let result = Attribute::update(
        &pool,
        999,
        UpdateAttribute {
            level: Some(2),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(result, Err(ModelError::NotFound(_))));
}

#[tokio::test]
async fn test_attribute_update_empty_body_is_validation_error() {
    let pool = test_pool().await;
    let id = Attribute::create(&pool, strength()).await.unwrap();

    let result = Attribute::update(&pool, id, UpdateAttribute::default()).await;
    assert!(matches!(result, Err(ModelError::Validation(_))));
}

#[tokio::test]
async fn test_attribute_delete() {
    let pool = test_pool().await;
    let id = Attribute::create(&pool, strength()).await.unwrap();

    let affected = Attribute::delete(&pool, id).await.unwrap();
    assert_eq!(affected, 1);

    let result = Attribute::find_by_id(&pool, id).await;
    assert!(matches!(result, Err(ModelError::NotFound(_))));

    let result = Attribute::delete(&pool, id).await;
    assert!(matches!(result, Err(ModelError::NotFound(_))));
}

#[tokio::test]
async fn test_task_create_with_unknown_owner_inserts_nothing() {
    let pool = test_pool().await;

    let result = Task::create(
        &pool,
        CreateTask {
            name: "Clean".to_string(),
            experience: 10,
            user_id: 42,
            completion_count: 0,
            attribute_ids: vec![],
        },
    )
    .await;

    assert!(matches!(result, Err(ModelError::InvalidOwner(_))));
    assert_eq!(task_count(&pool).await, 0);
}

#[tokio::test]
async fn test_task_find_by_id_resolves_existing_attributes_only() {
    let pool = test_pool().await;
    let user_id = User::create(&pool, alice()).await.unwrap();

    let a1 = Attribute::create(&pool, strength()).await.unwrap();
    let a2 = Attribute::create(
        &pool,
        CreateAttribute {
            name: "Agility".to_string(),
            level: 2,
            experience: 5,
        },
    )
    .await
    .unwrap();

    // 999 never existed; its id must be dropped silently at read time.
    let task_id = Task::create(
        &pool,
        CreateTask {
            name: "Train".to_string(),
            experience: 20,
            user_id,
            completion_count: 0,
            attribute_ids: vec![a1, a2, 999],
        },
    )
    .await
    .unwrap();

    let task = Task::find_by_id(&pool, task_id).await.unwrap();
    let mut resolved: Vec<i64> = task.attributes.iter().map(|a| a.id).collect();
    resolved.sort_unstable();
    assert_eq!(resolved, vec![a1, a2]);
}

#[tokio::test]
async fn test_task_find_by_id_with_empty_attribute_list() {
    let pool = test_pool().await;
    let user_id = User::create(&pool, alice()).await.unwrap();

    let task_id = Task::create(
        &pool,
        CreateTask {
            name: "Clean".to_string(),
            experience: 10,
            user_id,
            completion_count: 0,
            attribute_ids: vec![],
        },
    )
    .await
    .unwrap();

    let task = Task::find_by_id(&pool, task_id).await.unwrap();
    assert_eq!(task.name, "Clean");
    assert_eq!(task.completion_count, 0);
    assert!(task.attributes.is_empty());
}

#[tokio::test]
async fn test_task_update_reserializes_attribute_ids() {
    let pool = test_pool().await;
    let user_id = User::create(&pool, alice()).await.unwrap();

    let task_id = Task::create(
        &pool,
        CreateTask {
            name: "Clean".to_string(),
            experience: 10,
            user_id,
            completion_count: 0,
            attribute_ids: vec![1, 2],
        },
    )
    .await
    .unwrap();

    let affected = Task::update(
        &pool,
        task_id,
        UpdateTask {
            attribute_ids: Some(vec![7, 8, 9]),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(affected, 1);

    let (raw,): (String,) = sqlx::query_as("SELECT attribute_ids FROM tasks WHERE id = ?")
        .bind(task_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(raw, "7,8,9");
}

#[tokio::test]
async fn test_task_update_leaves_unsupplied_fields() {
    let pool = test_pool().await;
    let user_id = User::create(&pool, alice()).await.unwrap();

    let task_id = Task::create(
        &pool,
        CreateTask {
            name: "Clean".to_string(),
            experience: 10,
            user_id,
            completion_count: 0,
            attribute_ids: vec![],
        },
    )
    .await
    .unwrap();

    Task::update(
        &pool,
        task_id,
        UpdateTask {
            completion_count: Some(4),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let task = Task::find_by_id(&pool, task_id).await.unwrap();
    assert_eq!(task.completion_count, 4);
    assert_eq!(task.name, "Clean");
    assert_eq!(task.experience, 10);
}

#[tokio::test]
async fn test_task_update_unknown_id_is_not_found() {
    let pool = test_pool().await;

    let result = Task::update(
        &pool,
        999,
        UpdateTask {
            name: Some("Anything".to_string()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(result, Err(ModelError::NotFound(_))));
}

#[tokio::test]
async fn test_task_find_all_resolves_each_task() {
    let pool = test_pool().await;
    let user_id = User::create(&pool, alice()).await.unwrap();
    let a1 = Attribute::create(&pool, strength()).await.unwrap();

    Task::create(
        &pool,
        CreateTask {
            name: "Train".to_string(),
            experience: 20,
            user_id,
            completion_count: 0,
            attribute_ids: vec![a1],
        },
    )
    .await
    .unwrap();
    Task::create(
        &pool,
        CreateTask {
            name: "Clean".to_string(),
            experience: 10,
            user_id,
            completion_count: 0,
            attribute_ids: vec![],
        },
    )
    .await
    .unwrap();

    let mut tasks = Task::find_all(&pool).await.unwrap();
    tasks.sort_by_key(|t| t.id);
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].attributes.len(), 1);
    assert_eq!(tasks[0].attributes[0].id, a1);
    assert!(tasks[1].attributes.is_empty());
}

#[tokio::test]
async fn test_task_find_by_user_id() {
    let pool = test_pool().await;
    let user_id = User::create(&pool, alice()).await.unwrap();

    let result = Task::find_by_user_id(&pool, 999).await;
    assert!(matches!(result, Err(ModelError::InvalidOwner(_))));

    Task::create(
        &pool,
        CreateTask {
            name: "Clean".to_string(),
            experience: 10,
            user_id,
            completion_count: 0,
            attribute_ids: vec![3, 4],
        },
    )
    .await
    .unwrap();

    let tasks = Task::find_by_user_id(&pool, user_id).await.unwrap();
    assert_eq!(tasks.len(), 1);
    // Raw rows: the attribute list stays in its denormalized form.
    assert_eq!(tasks[0].attribute_ids, "3,4");
}

#[tokio::test]
async fn test_user_find_by_id_sentinel_for_unknown() {
    let pool = test_pool().await;
    let found = User::find_by_id(&pool, 123).await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_user_find_by_id_groups_owned_tasks() {
    let pool = test_pool().await;
    let user_id = User::create(&pool, alice()).await.unwrap();

    Task::create(
        &pool,
        CreateTask {
            name: "Clean".to_string(),
            experience: 10,
            user_id,
            completion_count: 0,
            attribute_ids: vec![2, 5],
        },
    )
    .await
    .unwrap();
    Task::create(
        &pool,
        CreateTask {
            name: "Cook".to_string(),
            experience: 15,
            user_id,
            completion_count: 1,
            attribute_ids: vec![],
        },
    )
    .await
    .unwrap();

    let user = User::find_by_id(&pool, user_id).await.unwrap().unwrap();
    assert_eq!(user.name, "Alice");
    assert_eq!(user.tasks.len(), 2);

    let clean = user.tasks.iter().find(|t| t.name == "Clean").unwrap();
    assert_eq!(clean.attribute_ids, vec![2, 5]);
    assert_eq!(clean.experience, 10);

    let cook = user.tasks.iter().find(|t| t.name == "Cook").unwrap();
    assert!(cook.attribute_ids.is_empty());
    assert_eq!(cook.completion_count, 1);
}

#[tokio::test]
async fn test_user_find_all_groups_by_user() {
    let pool = test_pool().await;
    let alice_id = User::create(&pool, alice()).await.unwrap();
    let bob_id = User::create(
        &pool,
        CreateUser {
            name: "Bob".to_string(),
            level: 2,
            experience: 40,
            rank: "adept".to_string(),
        },
    )
    .await
    .unwrap();

    Task::create(
        &pool,
        CreateTask {
            name: "Clean".to_string(),
            experience: 10,
            user_id: alice_id,
            completion_count: 0,
            attribute_ids: vec![],
        },
    )
    .await
    .unwrap();

    let users = User::find_all(&pool).await.unwrap();
    assert_eq!(users.len(), 2);

    let alice = users.iter().find(|u| u.id == alice_id).unwrap();
    let bob = users.iter().find(|u| u.id == bob_id).unwrap();
    assert_eq!(alice.tasks.len(), 1);
    assert!(bob.tasks.is_empty());
}

#[tokio::test]
async fn test_user_update_partial_fields() {
    let pool = test_pool().await;
    let user_id = User::create(&pool, alice()).await.unwrap();

    let affected = User::update(
        &pool,
        user_id,
        UpdateUser {
            level: Some(2),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(affected, 1);

    let user = User::find_by_id(&pool, user_id).await.unwrap().unwrap();
    assert_eq!(user.level, 2);
    assert_eq!(user.name, "Alice");
    assert_eq!(user.rank, "novice");
}

#[tokio::test]
async fn test_user_update_unknown_id_affects_zero_rows() {
    let pool = test_pool().await;

    let affected = User::update(
        &pool,
        999,
        UpdateUser {
            level: Some(2),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(affected, 0);
}

#[tokio::test]
async fn test_user_delete_cascades_to_owned_tasks() {
    let pool = test_pool().await;
    let user_id = User::create(&pool, alice()).await.unwrap();

    for name in ["Clean", "Cook"] {
        Task::create(
            &pool,
            CreateTask {
                name: name.to_string(),
                experience: 10,
                user_id,
                completion_count: 0,
                attribute_ids: vec![],
            },
        )
        .await
        .unwrap();
    }
    assert_eq!(task_count(&pool).await, 2);

    let affected = User::delete(&pool, user_id).await.unwrap();
    assert_eq!(affected, 1);
    assert_eq!(task_count(&pool).await, 0);
}

#[tokio::test]
async fn test_add_and_remove_task_ids_on_user() {
    let pool = test_pool().await;
    let user_id = User::create(&pool, alice()).await.unwrap();

    User::add_task_to_user(&pool, user_id, 7).await.unwrap();
    User::add_task_to_user(&pool, user_id, 9).await.unwrap();
    assert_eq!(raw_task_ids(&pool, user_id).await, "7,9");

    User::remove_task_from_user(&pool, user_id, 7).await.unwrap();
    assert_eq!(raw_task_ids(&pool, user_id).await, "9");
}

#[tokio::test]
async fn test_add_task_to_unknown_user_is_not_found() {
    let pool = test_pool().await;

    let result = User::add_task_to_user(&pool, 999, 1).await;
    assert!(matches!(result, Err(ModelError::NotFound(_))));
}

#[tokio::test]
async fn test_task_delete_leaves_stale_id_in_owner_list() {
    let pool = test_pool().await;
    let user_id = User::create(&pool, alice()).await.unwrap();

    let task_id = Task::create(
        &pool,
        CreateTask {
            name: "Clean".to_string(),
            experience: 10,
            user_id,
            completion_count: 0,
            attribute_ids: vec![],
        },
    )
    .await
    .unwrap();
    User::add_task_to_user(&pool, user_id, task_id).await.unwrap();

    Task::delete(&pool, task_id).await.unwrap();

    // The denormalized list is not rewritten by task deletion.
    assert_eq!(raw_task_ids(&pool, user_id).await, task_id.to_string());
}
