use axum::extract::State;

use crate::app::AppContext;
use crate::database::models::drink::DrinkSummary;
use crate::error::ApiError;
use crate::handlers::DrinksPayload;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /drinks - every drink in the summary view; 404 when the catalog is empty
pub async fn list(State(ctx): State<AppContext>) -> ApiResult<DrinksPayload<DrinkSummary>> {
    let drinks = ctx.store.list_all().await?;
    if drinks.is_empty() {
        return Err(ApiError::not_found("resource not found"));
    }

    Ok(ApiResponse::success(DrinksPayload {
        drinks: drinks.iter().map(|d| d.short()).collect(),
    }))
}
