/// User model and store operations
///
/// Users are the player records: level, experience, rank, and the tasks
/// they own. Ownership is stored twice: authoritatively as
/// `tasks.user_id`, and redundantly as the comma-joined `users.task_ids`
/// list, which is rewritten by `add_task_to_user` / `remove_task_from_user`.
/// The two representations are kept consistent by the callers, not by the
/// store; there is no transaction spanning a task insert and the list
/// append, and concurrent read-modify-writes of the list can lose an id.
///
/// Reads assemble a user together with their owned tasks via a left outer
/// join, grouped by user id.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id          INTEGER PRIMARY KEY AUTOINCREMENT,
///     name        TEXT NOT NULL,
///     level       INTEGER NOT NULL,
///     experience  INTEGER NOT NULL,
///     rank        TEXT NOT NULL,
///     task_ids    TEXT NOT NULL DEFAULT '',
///     created_at  TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
///     edited_at   TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
/// );
/// ```
///
/// Deleting a user cascades to the tasks whose `user_id` references it.
///
/// # Example
///
/// ```no_run
/// use questlog_shared::models::user::{CreateUser, User};
/// use questlog_shared::db::pool::{create_pool, StoreConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(StoreConfig::default()).await?;
///
/// let id = User::create(&pool, CreateUser {
///     name: "Alice".to_string(),
///     level: 1,
///     experience: 0,
///     rank: "novice".to_string(),
/// }).await?;
///
/// if let Some(user) = User::find_by_id(&pool, id).await? {
///     assert!(user.tasks.is_empty());
/// }
/// # Ok(())
/// # }
/// ```

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::id_list::IdList;
use super::ModelError;

/// User record with its owned tasks nested
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Row id
    pub id: i64,

    /// Display name
    pub name: String,

    /// Current level
    pub level: i64,

    /// Accumulated experience
    pub experience: i64,

    /// Rank title (e.g., "novice")
    pub rank: String,

    /// Owned tasks, built from the join
    pub tasks: Vec<UserTask>,

    /// When the user was created
    pub created_at: NaiveDateTime,

    /// When the user was last mutated
    pub edited_at: NaiveDateTime,
}

/// A task nested under its owning user
///
/// The attribute id list is parsed into numbers but not resolved to
/// attribute records.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTask {
    pub id: i64,
    pub name: String,
    pub experience: i64,
    pub completion_count: i64,
    pub attribute_ids: Vec<i64>,
}

/// Input for creating a new user
///
/// Deliberately unvalidated: this layer accepts whatever the caller sends.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub name: String,
    pub level: i64,
    pub experience: i64,
    pub rank: String,
}

/// Input for partially updating a user
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub level: Option<i64>,
    pub experience: Option<i64>,
    pub rank: Option<String>,
}

impl UpdateUser {
    /// True when no field is supplied
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.level.is_none()
            && self.experience.is_none()
            && self.rank.is_none()
    }
}

/// One row of the users ⟕ tasks join
#[derive(Debug, sqlx::FromRow)]
struct UserTaskRow {
    id: i64,
    name: String,
    level: i64,
    experience: i64,
    rank: String,
    created_at: NaiveDateTime,
    edited_at: NaiveDateTime,
    task_id: Option<i64>,
    task_name: Option<String>,
    task_experience: Option<i64>,
    completion_count: Option<i64>,
    attribute_ids: Option<String>,
}

const USER_TASK_JOIN: &str = r#"
    SELECT users.id, users.name, users.level, users.experience, users.rank,
           users.created_at, users.edited_at,
           tasks.id AS task_id, tasks.name AS task_name,
           tasks.experience AS task_experience,
           tasks.completion_count, tasks.attribute_ids
    FROM users
    LEFT JOIN tasks ON users.id = tasks.user_id
"#;

/// Groups join rows into one `User` per distinct user id, in first-seen
/// order, collecting the non-null task columns into the nested array
fn group_rows(rows: Vec<UserTaskRow>) -> Vec<User> {
    let mut order = Vec::new();
    let mut by_id: HashMap<i64, User> = HashMap::new();

    for row in rows {
        let user = by_id.entry(row.id).or_insert_with(|| {
            order.push(row.id);
            User {
                id: row.id,
                name: row.name.clone(),
                level: row.level,
                experience: row.experience,
                rank: row.rank.clone(),
                tasks: Vec::new(),
                created_at: row.created_at,
                edited_at: row.edited_at,
            }
        });

        if let Some(task_id) = row.task_id {
            user.tasks.push(UserTask {
                id: task_id,
                name: row.task_name.unwrap_or_default(),
                experience: row.task_experience.unwrap_or_default(),
                completion_count: row.completion_count.unwrap_or_default(),
                attribute_ids: IdList::parse(&row.attribute_ids.unwrap_or_default()).into_vec(),
            });
        }
    }

    order
        .into_iter()
        .filter_map(|id| by_id.remove(&id))
        .collect()
}

impl User {
    /// Creates a new user and returns its generated id
    pub async fn create(pool: &SqlitePool, data: CreateUser) -> Result<i64, ModelError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (name, level, experience, rank)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&data.name)
        .bind(data.level)
        .bind(data.experience)
        .bind(&data.rank)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Finds a user by id, with owned tasks nested
    ///
    /// Returns `Ok(None)` when the id matches no user; this is the
    /// not-found sentinel, distinct from an error.
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, ModelError> {
        let query = format!("{} WHERE users.id = ?", USER_TASK_JOIN);

        let rows = sqlx::query_as::<_, UserTaskRow>(&query)
            .bind(id)
            .fetch_all(pool)
            .await?;

        Ok(group_rows(rows).into_iter().next())
    }

    /// Partially updates a user, returning the affected row count
    ///
    /// `edited_at` is refreshed explicitly in the same statement, because
    /// this is a targeted field-list update rather than a row re-save. A
    /// zero count means the id matched no row; that is not an error at
    /// this layer.
    pub async fn update(pool: &SqlitePool, id: i64, data: UpdateUser) -> Result<u64, ModelError> {
        let mut fields = Vec::new();
        if data.name.is_some() {
            fields.push("name = ?");
        }
        if data.level.is_some() {
            fields.push("level = ?");
        }
        if data.experience.is_some() {
            fields.push("experience = ?");
        }
        if data.rank.is_some() {
            fields.push("rank = ?");
        }
        fields.push("edited_at = CURRENT_TIMESTAMP");

        let query = format!("UPDATE users SET {} WHERE id = ?", fields.join(", "));

        let mut q = sqlx::query(&query);
        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(level) = data.level {
            q = q.bind(level);
        }
        if let Some(experience) = data.experience {
            q = q.bind(experience);
        }
        if let Some(rank) = data.rank {
            q = q.bind(rank);
        }

        let result = q.bind(id).execute(pool).await?;
        Ok(result.rows_affected())
    }

    /// Deletes a user, returning the affected row count
    ///
    /// The store's `ON DELETE CASCADE` removes the user's tasks in the
    /// same statement.
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<u64, ModelError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Lists every user with owned tasks nested
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, ModelError> {
        let rows = sqlx::query_as::<_, UserTaskRow>(USER_TASK_JOIN)
            .fetch_all(pool)
            .await?;

        Ok(group_rows(rows))
    }

    /// Appends a task id to the user's denormalized `task_ids` list
    ///
    /// Read-modify-write with no locking; two concurrent appends to the
    /// same user can lose one id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the user row cannot be read.
    pub async fn add_task_to_user(
        pool: &SqlitePool,
        user_id: i64,
        task_id: i64,
    ) -> Result<u64, ModelError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT task_ids FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

        let (task_ids,) =
            row.ok_or_else(|| ModelError::NotFound(format!("user {} not found", user_id)))?;

        let mut list = IdList::parse(&task_ids);
        list.push(task_id);

        let result = sqlx::query(
            "UPDATE users SET task_ids = ?, edited_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(list.to_string())
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Removes a task id from the user's denormalized `task_ids` list
    ///
    /// Entries are compared as integers after parsing, so an id stored as
    /// text still matches the numeric argument.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the user row cannot be read.
    pub async fn remove_task_from_user(
        pool: &SqlitePool,
        user_id: i64,
        task_id: i64,
    ) -> Result<u64, ModelError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT task_ids FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

        let (task_ids,) =
            row.ok_or_else(|| ModelError::NotFound(format!("user {} not found", user_id)))?;

        let mut list = IdList::parse(&task_ids);
        list.remove(task_id);

        let result = sqlx::query(
            "UPDATE users SET task_ids = ?, edited_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(list.to_string())
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}
