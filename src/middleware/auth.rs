use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};

use crate::auth::{AuthError, Claims, TokenVerifier};
use crate::error::ApiError;

/// State for one gated route: who verifies, and what they must grant
#[derive(Clone)]
pub struct PermissionGate {
    pub verifier: Arc<TokenVerifier>,
    pub permission: &'static str,
}

/// Wrap `route` so it only runs for callers holding `permission`.
///
/// The verified [`Claims`] are inserted into request extensions for the
/// handler to pick up with `Extension<Claims>`.
pub fn require_permission<S>(
    route: MethodRouter<S>,
    verifier: Arc<TokenVerifier>,
    permission: &'static str,
) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route.route_layer(middleware::from_fn_with_state(
        PermissionGate {
            verifier,
            permission,
        },
        permission_gate,
    ))
}

/// Middleware body of [`require_permission`]
pub async fn permission_gate(
    State(gate): State<PermissionGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = authorize(&gate.verifier, request.headers(), gate.permission).map_err(|e| {
        tracing::warn!(
            "Refused {} {}: {} ({})",
            request.method(),
            request.uri().path(),
            e.code(),
            gate.permission
        );
        ApiError::from(e)
    })?;

    tracing::debug!("{} granted {}", claims.subject(), gate.permission);
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Verify the request's bearer token and check it grants `permission`
pub fn authorize(
    verifier: &TokenVerifier,
    headers: &HeaderMap,
    permission: &str,
) -> Result<Claims, AuthError> {
    let token = extract_bearer_token(headers)?;
    let claims = verifier.verify(token)?;
    claims.require(permission)?;
    Ok(claims)
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::MalformedHeader),
    }
}
