use std::time::Duration;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use super::models::drink::{Drink, DrinkDraft, DrinkRow};
use super::{duplicate_title, seed_drink, DrinkStore, StoreError};
use crate::config::DatabaseConfig;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS drinks (
        id SERIAL PRIMARY KEY,
        title VARCHAR(80) UNIQUE NOT NULL,
        recipe TEXT NOT NULL
    )
"#;

/// Drink store backed by a PostgreSQL `drinks` table
#[derive(Clone)]
pub struct PgDrinkStore {
    pool: PgPool,
}

impl PgDrinkStore {
    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Created database pool (max {} connections)", config.max_connections);
        Ok(Self { pool })
    }

    /// Create the drinks table if it does not exist yet
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    /// Drop and recreate the drinks table, then seed it with a single drink.
    /// Destroys every stored record.
    pub async fn reset(&self) -> Result<Drink, StoreError> {
        sqlx::query("DROP TABLE IF EXISTS drinks")
            .execute(&self.pool)
            .await?;
        self.ensure_schema().await?;

        let seeded = self.insert(seed_drink()).await?;
        info!("Reset drinks table, seeded '{}'", seeded.title);
        Ok(seeded)
    }
}

#[async_trait]
impl DrinkStore for PgDrinkStore {
    async fn list_all(&self) -> Result<Vec<Drink>, StoreError> {
        let rows = sqlx::query_as::<_, DrinkRow>("SELECT id, title, recipe FROM drinks ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Drink::try_from).collect()
    }

    async fn insert(&self, draft: DrinkDraft) -> Result<Drink, StoreError> {
        draft.validate()?;
        let recipe = draft.recipe_text()?;

        let row = sqlx::query_as::<_, DrinkRow>(
            "INSERT INTO drinks (title, recipe) VALUES ($1, $2) RETURNING id, title, recipe",
        )
        .bind(&draft.title)
        .bind(&recipe)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &draft.title))?;

        Drink::try_from(row)
    }

    async fn update(&self, id: i32, draft: DrinkDraft) -> Result<Drink, StoreError> {
        draft.validate()?;
        let recipe = draft.recipe_text()?;

        let row = sqlx::query_as::<_, DrinkRow>(
            "UPDATE drinks SET title = $2, recipe = $3 WHERE id = $1 RETURNING id, title, recipe",
        )
        .bind(id)
        .bind(&draft.title)
        .bind(&recipe)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &draft.title))?;

        match row {
            Some(row) => Drink::try_from(row),
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn delete(&self, id: i32) -> Result<i32, StoreError> {
        let deleted: Option<i32> = sqlx::query_scalar("DELETE FROM drinks WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        deleted.ok_or(StoreError::NotFound(id))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}

fn map_write_error(err: sqlx::Error, title: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => duplicate_title(title),
        _ => StoreError::Sqlx(err),
    }
}
