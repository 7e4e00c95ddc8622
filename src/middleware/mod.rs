pub mod auth;
pub mod response;

pub use auth::{authorize, extract_bearer_token, require_permission, PermissionGate};
pub use response::{ApiResponse, ApiResult};
