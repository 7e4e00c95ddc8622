use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Json, Path, State,
    },
    Extension,
};
use tracing::info;

use crate::app::AppContext;
use crate::auth::Claims;
use crate::database::models::drink::DrinkDetail;
use crate::error::ApiError;
use crate::handlers::{parse_draft, parse_id, DeletedPayload, DrinkInput, DrinksPayload};
use crate::middleware::{ApiResponse, ApiResult};

/// GET /drinks-detail - every drink in the detailed view; 404 when empty
pub async fn detail(State(ctx): State<AppContext>) -> ApiResult<DrinksPayload<DrinkDetail>> {
    let drinks = ctx.store.list_all().await?;
    if drinks.is_empty() {
        return Err(ApiError::not_found("resource not found"));
    }

    Ok(ApiResponse::success(DrinksPayload {
        drinks: drinks.iter().map(|d| d.long()).collect(),
    }))
}

/// POST /drinks - create a drink from `{title, recipe}`
pub async fn create(
    State(ctx): State<AppContext>,
    Extension(claims): Extension<Claims>,
    body: Result<Json<DrinkInput>, JsonRejection>,
) -> ApiResult<DrinksPayload<DrinkDetail>> {
    let draft = parse_draft(body)?;
    let drink = ctx.store.insert(draft).await?;

    info!("{} created drink {} '{}'", claims.subject(), drink.id, drink.title);
    Ok(ApiResponse::success(DrinksPayload::single(drink.long())))
}

/// PATCH /drinks/:id - replace title and recipe of an existing drink
///
/// The body is validated before the drink is looked up, so an invalid body
/// is a 400 whether or not the id exists.
pub async fn update(
    State(ctx): State<AppContext>,
    Extension(claims): Extension<Claims>,
    id: Result<Path<i32>, PathRejection>,
    body: Result<Json<DrinkInput>, JsonRejection>,
) -> ApiResult<DrinksPayload<DrinkDetail>> {
    let id = parse_id(id)?;
    let draft = parse_draft(body)?;
    let drink = ctx.store.update(id, draft).await?;

    info!("{} updated drink {}", claims.subject(), drink.id);
    Ok(ApiResponse::success(DrinksPayload::single(drink.long())))
}

/// DELETE /drinks/:id
pub async fn delete(
    State(ctx): State<AppContext>,
    Extension(claims): Extension<Claims>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<DeletedPayload> {
    let id = parse_id(id)?;
    let deleted = ctx.store.delete(id).await?;

    info!("{} deleted drink {}", claims.subject(), deleted);
    Ok(ApiResponse::success(DeletedPayload { delete: deleted }))
}
