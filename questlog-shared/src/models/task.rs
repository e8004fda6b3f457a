/// Task model and store operations
///
/// Tasks are the units of work users complete for experience. Every task
/// belongs to exactly one user; the owner's existence is checked before the
/// insert, and the store cascades task deletion when the owner is deleted.
///
/// A task's associated attributes are kept as a denormalized comma-joined
/// id list. The list is not a foreign key: it is resolved opportunistically
/// at read time with a membership query, and ids that no longer exist in
/// the `attributes` table are silently dropped from the resolved result.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id               INTEGER PRIMARY KEY AUTOINCREMENT,
///     name             TEXT NOT NULL,
///     experience       INTEGER NOT NULL,
///     completion_count INTEGER NOT NULL DEFAULT 0,
///     attribute_ids    TEXT NOT NULL DEFAULT '',
///     user_id          INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use questlog_shared::models::task::{CreateTask, Task};
/// use questlog_shared::db::pool::{create_pool, StoreConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(StoreConfig::default()).await?;
///
/// let id = Task::create(&pool, CreateTask {
///     name: "Clean the kitchen".to_string(),
///     experience: 10,
///     user_id: 1,
///     completion_count: 0,
///     attribute_ids: vec![2, 5],
/// }).await?;
///
/// let task = Task::find_by_id(&pool, id).await?;
/// assert_eq!(task.name, "Clean the kitchen");
/// # Ok(())
/// # }
/// ```

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use validator::Validate;

use super::attribute::Attribute;
use super::id_list::IdList;
use super::{not_blank, ModelError};

/// Task row as stored, with the attribute id list still in its raw
/// comma-joined form
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Row id
    pub id: i64,

    /// Display name
    pub name: String,

    /// Experience awarded per completion, always >= 1
    pub experience: i64,

    /// How many times the task has been completed
    pub completion_count: i64,

    /// Denormalized comma-joined attribute id list
    pub attribute_ids: String,

    /// Owning user
    pub user_id: i64,
}

/// Task with its attribute id list resolved to full records
///
/// Only ids present in the `attributes` table at read time appear in
/// `attributes`; stale ids are dropped.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskWithAttributes {
    pub id: i64,
    pub name: String,
    pub experience: i64,
    pub completion_count: i64,
    pub attributes: Vec<Attribute>,
    pub user_id: i64,
}

/// Input for creating a new task
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    #[validate(custom(function = "not_blank"))]
    pub name: String,

    #[validate(range(min = 1, message = "must be a positive number"))]
    pub experience: i64,

    /// Owning user; must reference an existing user
    pub user_id: i64,

    /// Defaults to 0
    #[serde(default)]
    #[validate(range(min = 0, message = "must be a non-negative integer"))]
    pub completion_count: i64,

    /// Defaults to the empty list
    #[serde(default)]
    pub attribute_ids: Vec<i64>,
}

/// Input for partially updating a task
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateTask {
    #[validate(custom(function = "not_blank"))]
    pub name: Option<String>,

    #[validate(range(min = 1, message = "must be a positive number"))]
    pub experience: Option<i64>,

    #[validate(range(min = 0, message = "must be a non-negative integer"))]
    pub completion_count: Option<i64>,

    pub attribute_ids: Option<Vec<i64>>,
}

impl UpdateTask {
    /// True when no field is supplied
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.experience.is_none()
            && self.completion_count.is_none()
            && self.attribute_ids.is_none()
    }
}

impl Task {
    fn with_attributes(self, attributes: Vec<Attribute>) -> TaskWithAttributes {
        TaskWithAttributes {
            id: self.id,
            name: self.name,
            experience: self.experience,
            completion_count: self.completion_count,
            attributes,
            user_id: self.user_id,
        }
    }

    /// Creates a new task and returns its generated id
    ///
    /// The owning user's existence is checked first; the insert is only
    /// issued when the owner exists. Appending the new id to the owner's
    /// `task_ids` is the caller's second, separate write.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for malformed input, `InvalidOwner` when
    /// `user_id` references no user, `Database` if a query fails.
    pub async fn create(pool: &SqlitePool, data: CreateTask) -> Result<i64, ModelError> {
        data.validate().map_err(ModelError::from_validation)?;

        let owner = sqlx::query("SELECT id FROM users WHERE id = ?")
            .bind(data.user_id)
            .fetch_optional(pool)
            .await?;

        if owner.is_none() {
            return Err(ModelError::InvalidOwner(format!(
                "user {} does not exist",
                data.user_id
            )));
        }

        let attribute_ids = IdList::from(data.attribute_ids);

        let result = sqlx::query(
            r#"
            INSERT INTO tasks (name, experience, completion_count, attribute_ids, user_id)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&data.name)
        .bind(data.experience)
        .bind(data.completion_count)
        .bind(attribute_ids.to_string())
        .bind(data.user_id)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Finds a task by id, with its attribute list resolved
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no row matches.
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<TaskWithAttributes, ModelError> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, name, experience, completion_count, attribute_ids, user_id
            FROM tasks
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ModelError::NotFound(format!("task {} not found", id)))?;

        let attributes = resolve_attributes(pool, &IdList::parse(&task.attribute_ids)).await?;
        Ok(task.with_attributes(attributes))
    }

    /// Partially updates a task, returning the affected row count
    ///
    /// A supplied `attribute_ids` list is re-serialized to the denormalized
    /// form before the write.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when a supplied field is invalid or no field is
    /// supplied at all, `NotFound` when zero rows matched the id.
    pub async fn update(pool: &SqlitePool, id: i64, data: UpdateTask) -> Result<u64, ModelError> {
        data.validate().map_err(ModelError::from_validation)?;

        if data.is_empty() {
            return Err(ModelError::Validation("no fields to update".to_string()));
        }

        let mut fields = Vec::new();
        if data.name.is_some() {
            fields.push("name = ?");
        }
        if data.experience.is_some() {
            fields.push("experience = ?");
        }
        if data.completion_count.is_some() {
            fields.push("completion_count = ?");
        }
        if data.attribute_ids.is_some() {
            fields.push("attribute_ids = ?");
        }

        let query = format!("UPDATE tasks SET {} WHERE id = ?", fields.join(", "));

        let mut q = sqlx::query(&query);
        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(experience) = data.experience {
            q = q.bind(experience);
        }
        if let Some(completion_count) = data.completion_count {
            q = q.bind(completion_count);
        }
        if let Some(attribute_ids) = data.attribute_ids {
            q = q.bind(IdList::from(attribute_ids).to_string());
        }

        let result = q.bind(id).execute(pool).await?;

        if result.rows_affected() == 0 {
            return Err(ModelError::NotFound(format!("task {} not found", id)));
        }

        Ok(result.rows_affected())
    }

    /// Deletes a task, returning the affected row count
    ///
    /// The owner's denormalized `task_ids` is left untouched; the stale id
    /// drops out only when that list is next rewritten.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when zero rows matched.
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<u64, ModelError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ModelError::NotFound(format!("task {} not found", id)));
        }

        Ok(result.rows_affected())
    }

    /// Lists every task with attributes resolved
    ///
    /// Each task's list is resolved independently; the resolutions run
    /// concurrently and the call returns once all of them have completed.
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<TaskWithAttributes>, ModelError> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, name, experience, completion_count, attribute_ids, user_id
            FROM tasks
            "#,
        )
        .fetch_all(pool)
        .await?;

        let resolutions = tasks.into_iter().map(|task| async move {
            let attributes = resolve_attributes(pool, &IdList::parse(&task.attribute_ids)).await?;
            Ok::<_, ModelError>(task.with_attributes(attributes))
        });

        try_join_all(resolutions).await
    }

    /// Lists a user's tasks as raw rows, without attribute resolution
    ///
    /// # Errors
    ///
    /// Returns `InvalidOwner` when the user does not exist.
    pub async fn find_by_user_id(pool: &SqlitePool, user_id: i64) -> Result<Vec<Self>, ModelError> {
        let owner = sqlx::query("SELECT id FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

        if owner.is_none() {
            return Err(ModelError::InvalidOwner(format!(
                "user {} does not exist",
                user_id
            )));
        }

        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, name, experience, completion_count, attribute_ids, user_id
            FROM tasks
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }
}

/// Resolves an id list to the attribute records that currently exist
///
/// An empty list short-circuits without touching the store, so a
/// membership query against an empty id set is never issued.
pub(crate) async fn resolve_attributes(
    pool: &SqlitePool,
    list: &IdList,
) -> Result<Vec<Attribute>, ModelError> {
    if list.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; list.len()].join(", ");
    let query = format!(
        "SELECT id, name, level, experience, created_at, edited_at \
         FROM attributes WHERE id IN ({})",
        placeholders
    );

    let mut q = sqlx::query_as::<_, Attribute>(&query);
    for &id in list.ids() {
        q = q.bind(id);
    }

    Ok(q.fetch_all(pool).await?)
}
