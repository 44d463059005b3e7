//! User point DTOs.

use serde::Serialize;
use utoipa::ToSchema;

/// Current balance of one user.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserPointResponse {
    /// Balance; zero for users with no ledger activity.
    pub point: i64,
}
