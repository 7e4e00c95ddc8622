pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryDrinkStore;
pub use models::drink::{Drink, DrinkDraft, Ingredient};
pub use postgres::PgDrinkStore;

/// Errors from the drink record store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Drink {0} not found")]
    NotFound(i32),

    #[error("Stored recipe could not be encoded or decoded: {0}")]
    Encoding(#[source] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Repository over the drinks relation.
///
/// Implementations enforce the same invariants: titles are non-empty and
/// unique, recipes are non-empty, ids are assigned by the store and never
/// reused.
#[async_trait]
pub trait DrinkStore: Send + Sync {
    /// All drinks ordered by ascending id
    async fn list_all(&self) -> Result<Vec<Drink>, StoreError>;

    async fn insert(&self, draft: DrinkDraft) -> Result<Drink, StoreError>;

    /// Replaces title and recipe of an existing drink
    async fn update(&self, id: i32, draft: DrinkDraft) -> Result<Drink, StoreError>;

    /// Removes the drink and returns its id
    async fn delete(&self, id: i32) -> Result<i32, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn close(&self) {}
}

/// Title conflict message shared by the store implementations
pub(crate) fn duplicate_title(title: &str) -> StoreError {
    StoreError::Conflict(format!("a drink titled '{}' already exists", title))
}

/// The drink a freshly reset catalog starts with
pub fn seed_drink() -> DrinkDraft {
    DrinkDraft::new(
        "water",
        vec![Ingredient {
            color: "blue".into(),
            name: Some("water".into()),
            parts: 1,
        }],
    )
}
