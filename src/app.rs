use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::TokenVerifier;
use crate::config::SecurityConfig;
use crate::database::DrinkStore;
use crate::handlers::{self, protected, public};
use crate::middleware::require_permission;

pub const GET_DRINKS_DETAIL: &str = "get:drinks-detail";
pub const POST_DRINKS: &str = "post:drinks";
pub const PATCH_DRINKS: &str = "patch:drinks";
pub const DELETE_DRINKS: &str = "delete:drinks";

/// Everything a request handler needs, built once at startup and passed
/// to the router as state
#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<dyn DrinkStore>,
    pub verifier: Arc<TokenVerifier>,
}

impl AppContext {
    pub fn new(store: Arc<dyn DrinkStore>, verifier: TokenVerifier) -> Self {
        Self {
            store,
            verifier: Arc::new(verifier),
        }
    }

    /// Release store resources; call after the server has stopped
    pub async fn close(&self) {
        self.store.close().await;
    }
}

pub fn router(ctx: AppContext, security: &SecurityConfig) -> Router {
    let verifier = ctx.verifier.clone();

    Router::new()
        // Public
        .route(
            "/health",
            get(public::health).fallback(handlers::method_not_allowed),
        )
        .route(
            "/drinks",
            get(public::drinks_list)
                .merge(require_permission(
                    post(protected::drinks_create),
                    verifier.clone(),
                    POST_DRINKS,
                ))
                .fallback(handlers::method_not_allowed),
        )
        // Protected
        .route(
            "/drinks-detail",
            require_permission(get(protected::drinks_detail), verifier.clone(), GET_DRINKS_DETAIL)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/drinks/:id",
            require_permission(patch(protected::drinks_update), verifier.clone(), PATCH_DRINKS)
                .merge(require_permission(
                    delete(protected::drinks_delete),
                    verifier,
                    DELETE_DRINKS,
                ))
                .fallback(handlers::method_not_allowed),
        )
        .fallback(handlers::not_found)
        .with_state(ctx)
        // Global middleware
        .layer(cors_layer(security))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origins = if security.cors_origins.is_empty() {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = security
            .cors_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::PATCH])
}
