/// Attribute model and store operations
///
/// Attributes are standalone skill/trait records with a level and an
/// experience value. Tasks reference them by id through their denormalized
/// `attribute_ids` list; deleting an attribute has no cascading children,
/// the dangling id is simply dropped the next time the list is resolved.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE attributes (
///     id          INTEGER PRIMARY KEY AUTOINCREMENT,
///     name        TEXT NOT NULL,
///     level       INTEGER NOT NULL,
///     experience  INTEGER NOT NULL,
///     created_at  TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
///     edited_at   TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
/// );
/// ```
///
/// `edited_at` is refreshed by an `AFTER UPDATE` trigger on every mutation.
///
/// # Example
///
/// ```no_run
/// use questlog_shared::models::attribute::{Attribute, CreateAttribute};
/// use questlog_shared::db::pool::{create_pool, StoreConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(StoreConfig::default()).await?;
///
/// let id = Attribute::create(&pool, CreateAttribute {
///     name: "Strength".to_string(),
///     level: 1,
///     experience: 10,
/// }).await?;
///
/// let attribute = Attribute::find_by_id(&pool, id).await?;
/// assert_eq!(attribute.name, "Strength");
/// # Ok(())
/// # }
/// ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use validator::Validate;

use super::{not_blank, ModelError};

/// Attribute record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    /// Row id
    pub id: i64,

    /// Display name
    pub name: String,

    /// Current level, always >= 1
    pub level: i64,

    /// Accumulated experience, always >= 1
    pub experience: i64,

    /// When the attribute was created
    pub created_at: NaiveDateTime,

    /// When the attribute was last mutated
    pub edited_at: NaiveDateTime,
}

/// Input for creating a new attribute
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAttribute {
    #[validate(custom(function = "not_blank"))]
    pub name: String,

    #[validate(range(min = 1, message = "must be a positive number"))]
    pub level: i64,

    #[validate(range(min = 1, message = "must be a positive number"))]
    pub experience: i64,
}

/// Input for partially updating an attribute
///
/// Only the supplied fields are written; the rules are the same as on
/// create.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateAttribute {
    #[validate(custom(function = "not_blank"))]
    pub name: Option<String>,

    #[validate(range(min = 1, message = "must be a positive number"))]
    pub level: Option<i64>,

    #[validate(range(min = 1, message = "must be a positive number"))]
    pub experience: Option<i64>,
}

impl UpdateAttribute {
    /// True when no field is supplied
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.level.is_none() && self.experience.is_none()
    }
}

impl Attribute {
    /// Creates a new attribute and returns its generated id
    ///
    /// # Errors
    ///
    /// Returns `Validation` if `name` is blank or `level`/`experience` are
    /// not positive, `Database` if the insert fails.
    pub async fn create(pool: &SqlitePool, data: CreateAttribute) -> Result<i64, ModelError> {
        data.validate().map_err(ModelError::from_validation)?;

        let result = sqlx::query(
            r#"
            INSERT INTO attributes (name, level, experience)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&data.name)
        .bind(data.level)
        .bind(data.experience)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Finds an attribute by id
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no row matches.
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Self, ModelError> {
        sqlx::query_as::<_, Attribute>(
            r#"
            SELECT id, name, level, experience, created_at, edited_at
            FROM attributes
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ModelError::NotFound(format!("attribute {} not found", id)))
    }

    /// Partially updates an attribute, returning the affected row count
    ///
    /// Builds the update statement from the supplied fields only. The
    /// `edited_at` refresh is left to the store trigger.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when a supplied field is invalid or no field is
    /// supplied at all, `NotFound` when zero rows matched the id.
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: UpdateAttribute,
    ) -> Result<u64, ModelError> {
        data.validate().map_err(ModelError::from_validation)?;

        if data.is_empty() {
            return Err(ModelError::Validation("no fields to update".to_string()));
        }

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

        let query = format!("UPDATE attributes SET {} WHERE id = ?", fields.join(", "));

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

        let result = q.bind(id).execute(pool).await?;

        if result.rows_affected() == 0 {
            return Err(ModelError::NotFound(format!(
                "attribute {} not found",
                id
            )));
        }

        Ok(result.rows_affected())
    }

    /// Deletes an attribute, returning the affected row count
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when zero rows matched.
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<u64, ModelError> {
        let result = sqlx::query("DELETE FROM attributes WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ModelError::NotFound(format!(
                "attribute {} not found",
                id
            )));
        }

        Ok(result.rows_affected())
    }

    /// Lists every attribute
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, ModelError> {
        let attributes = sqlx::query_as::<_, Attribute>(
            r#"
            SELECT id, name, level, experience, created_at, edited_at
            FROM attributes
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_rejects_blank_name() {
        let data = CreateAttribute {
            name: "   ".to_string(),
            level: 1,
            experience: 1,
        };
        assert!(data.validate().is_err());
    }

    #[test]
    fn test_create_rejects_non_positive_numbers() {
        let data = CreateAttribute {
            name: "Strength".to_string(),
            level: 0,
            experience: 10,
        };
        assert!(data.validate().is_err());

        let data = CreateAttribute {
            name: "Strength".to_string(),
            level: 1,
            experience: -3,
        };
        assert!(data.validate().is_err());
    }

    #[test]
    fn test_create_accepts_valid_input() {
        let data = CreateAttribute {
            name: "Strength".to_string(),
            level: 1,
            experience: 10,
        };
        assert!(data.validate().is_ok());
    }

    #[test]
    fn test_update_validates_only_supplied_fields() {
        let data = UpdateAttribute {
            level: Some(3),
            ..Default::default()
        };
        assert!(data.validate().is_ok());

        let data = UpdateAttribute {
            level: Some(0),
            ..Default::default()
        };
        assert!(data.validate().is_err());
    }

    #[test]
    fn test_update_is_empty() {
        assert!(UpdateAttribute::default().is_empty());
        assert!(!UpdateAttribute {
            name: Some("Agility".to_string()),
            ..Default::default()
        }
        .is_empty());
    }
}
