pub mod auth;
pub mod response;

pub use auth::{authenticate_jwt, ensure_admin, ensure_correct_user, ensure_logged_in, AuthUser};
pub use response::{ApiResponse, ApiResult};
