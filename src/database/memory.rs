use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::models::drink::{Drink, DrinkDraft};
use super::{duplicate_title, DrinkStore, StoreError};

/// In-process drink store used by tests and `--in-memory` runs
#[derive(Default)]
pub struct MemoryDrinkStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    drinks: BTreeMap<i32, Drink>,
    last_id: i32,
}

impl MemoryDrinkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Inner {
    fn title_taken(&self, title: &str, except: Option<i32>) -> bool {
        self.drinks
            .values()
            .any(|d| d.title == title && Some(d.id) != except)
    }
}

#[async_trait]
impl DrinkStore for MemoryDrinkStore {
    async fn list_all(&self) -> Result<Vec<Drink>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.drinks.values().cloned().collect())
    }

    async fn insert(&self, draft: DrinkDraft) -> Result<Drink, StoreError> {
        draft.validate()?;

        let mut inner = self.inner.write().await;
        if inner.title_taken(&draft.title, None) {
            return Err(duplicate_title(&draft.title));
        }

        inner.last_id += 1;
        let drink = Drink {
            id: inner.last_id,
            title: draft.title,
            recipe: draft.recipe,
        };
        inner.drinks.insert(drink.id, drink.clone());
        Ok(drink)
    }

    async fn update(&self, id: i32, draft: DrinkDraft) -> Result<Drink, StoreError> {
        draft.validate()?;

        let mut inner = self.inner.write().await;
        if !inner.drinks.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        if inner.title_taken(&draft.title, Some(id)) {
            return Err(duplicate_title(&draft.title));
        }

        let drink = Drink {
            id,
            title: draft.title,
            recipe: draft.recipe,
        };
        inner.drinks.insert(id, drink.clone());
        Ok(drink)
    }

    async fn delete(&self, id: i32) -> Result<i32, StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .drinks
            .remove(&id)
            .map(|d| d.id)
            .ok_or(StoreError::NotFound(id))
    }
}
