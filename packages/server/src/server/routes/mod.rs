// HTTP routes
pub mod contacts;
pub mod health;
pub mod schools;

pub use contacts::*;
pub use health::*;
pub use schools::*;

use crate::server::ApiError;

/// Fallback for routes that only accept `POST`.
pub async fn post_only() -> ApiError {
    ApiError::method_not_allowed("POST")
}

/// Fallback for routes that only accept `GET`.
pub async fn get_only() -> ApiError {
    ApiError::method_not_allowed("GET")
}
