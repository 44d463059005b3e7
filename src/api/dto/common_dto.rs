//! Shared DTO types used across multiple endpoints.

use serde::Serialize;
use utoipa::ToSchema;

/// Success envelope: `{"success": true, "response": ...}`.
///
/// Errors use [`crate::error::ErrorResponse`] instead.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Always `true`.
    pub success: bool,
    /// Endpoint payload.
    pub response: T,
}

impl<T> ApiResponse<T> {
    /// Wraps a successful payload.
    #[must_use]
    pub const fn ok(response: T) -> Self {
        Self {
            success: true,
            response,
        }
    }
}
