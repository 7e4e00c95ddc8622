use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::StoreError;

/// Longest title the drinks table accepts
pub const MAX_TITLE_LEN: usize = 80;

/// One line of a recipe: a colored layer of some ingredient in the cup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub parts: u32,
}

/// A persisted drink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drink {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// Title and recipe as supplied by a caller, before the store assigns an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrinkDraft {
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// Recipe as accepted over the wire: a list, or a single ingredient object
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RecipeInput {
    Many(Vec<Ingredient>),
    One(Ingredient),
}

impl From<RecipeInput> for Vec<Ingredient> {
    fn from(input: RecipeInput) -> Self {
        match input {
            RecipeInput::Many(items) => items,
            RecipeInput::One(item) => vec![item],
        }
    }
}

/// Ingredient without its name, for the public listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngredientSummary {
    pub color: String,
    pub parts: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrinkSummary {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<IngredientSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrinkDetail {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

impl Drink {
    /// Summary view: ingredient names are dropped
    pub fn short(&self) -> DrinkSummary {
        DrinkSummary {
            id: self.id,
            title: self.title.clone(),
            recipe: self
                .recipe
                .iter()
                .map(|i| IngredientSummary {
                    color: i.color.clone(),
                    parts: i.parts,
                })
                .collect(),
        }
    }

    /// Detailed view: the full recipe
    pub fn long(&self) -> DrinkDetail {
        DrinkDetail {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.clone(),
        }
    }
}

impl DrinkDraft {
    /// Surrounding whitespace is stripped from the title; it is what gets stored
    pub fn new(title: impl Into<String>, recipe: Vec<Ingredient>) -> Self {
        let title: String = title.into();
        Self {
            title: title.trim().to_string(),
            recipe,
        }
    }

    /// Checks the invariants every persisted drink must satisfy
    pub fn validate(&self) -> Result<(), StoreError> {
        let title = self.title.as_str();
        if title.is_empty() {
            return Err(StoreError::Validation("title must not be empty".into()));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(StoreError::Validation(format!(
                "title must be at most {} characters",
                MAX_TITLE_LEN
            )));
        }
        if self.recipe.is_empty() {
            return Err(StoreError::Validation("recipe must not be empty".into()));
        }
        if self.recipe.iter().any(|i| i.color.trim().is_empty()) {
            return Err(StoreError::Validation(
                "every ingredient needs a color".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn recipe_text(&self) -> Result<String, StoreError> {
        serde_json::to_string(&self.recipe).map_err(StoreError::Encoding)
    }
}

/// Row shape of the drinks table; the recipe column holds serialized JSON
#[derive(Debug, Clone, FromRow)]
pub struct DrinkRow {
    pub id: i32,
    pub title: String,
    pub recipe: String,
}

impl TryFrom<DrinkRow> for Drink {
    type Error = StoreError;

    fn try_from(row: DrinkRow) -> Result<Self, Self::Error> {
        let recipe = serde_json::from_str(&row.recipe).map_err(StoreError::Encoding)?;
        Ok(Drink {
            id: row.id,
            title: row.title,
            recipe,
        })
    }
}
