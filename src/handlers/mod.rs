// handlers/mod.rs - route handlers, split by security tier
//
// Public (no token) → Protected (bearer token carrying the route's permission)

pub mod protected;
pub mod public;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Json, Path};
use serde::{Deserialize, Serialize};

use crate::database::models::drink::{DrinkDetail, DrinkDraft, RecipeInput};
use crate::error::ApiError;

/// `{drinks: [...]}` payload shared by the list, create and update routes
#[derive(Debug, Serialize)]
pub struct DrinksPayload<T: Serialize> {
    pub drinks: Vec<T>,
}

/// `{delete: id}` payload of the delete route
#[derive(Debug, Serialize)]
pub struct DeletedPayload {
    pub delete: i32,
}

impl DrinksPayload<DrinkDetail> {
    pub fn single(drink: DrinkDetail) -> Self {
        Self { drinks: vec![drink] }
    }
}

/// Request body of create and update; absent fields become empty and fail validation
#[derive(Debug, Default, Deserialize)]
pub struct DrinkInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub recipe: Option<RecipeInput>,
}

impl DrinkInput {
    pub fn into_draft(self) -> DrinkDraft {
        DrinkDraft::new(
            self.title.unwrap_or_default(),
            self.recipe.map(Into::into).unwrap_or_default(),
        )
    }
}

/// Parse and validate a JSON drink body into a draft
pub fn parse_draft(body: Result<Json<DrinkInput>, JsonRejection>) -> Result<DrinkDraft, ApiError> {
    let Json(input) = body.map_err(|e| {
        tracing::debug!("Rejected drink body: {}", e);
        ApiError::bad_request("bad request")
    })?;

    let draft = input.into_draft();
    draft.validate()?;
    Ok(draft)
}

/// Drink ids that do not parse as integers name no drink
pub fn parse_id(id: Result<Path<i32>, PathRejection>) -> Result<i32, ApiError> {
    id.map(|Path(id)| id)
        .map_err(|_| ApiError::not_found("resource not found"))
}

/// Fallback for unknown routes
pub async fn not_found() -> ApiError {
    ApiError::not_found("resource not found")
}

/// Fallback for known paths hit with a method they do not serve
pub async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed("method not allowed")
}
