use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

/// Success envelope: the payload's fields are merged next to `success: true`.
///
/// The payload must serialize to a JSON object.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub payload: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(payload: T) -> Self {
        Self { payload }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let fields = match serde_json::to_value(&self.payload) {
            Ok(Value::Object(fields)) => fields,
            Ok(other) => {
                tracing::error!("Response payload is not an object: {}", other);
                return internal_error();
            }
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return internal_error();
            }
        };

        let mut envelope = serde_json::Map::with_capacity(fields.len() + 1);
        envelope.insert("success".into(), Value::Bool(true));
        envelope.extend(fields);

        (StatusCode::OK, Json(Value::Object(envelope))).into_response()
    }
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "error": 500,
            "message": "internal server error",
            "code": "internal_server_error"
        })),
    )
        .into_response()
}

// Convenience type alias
pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
