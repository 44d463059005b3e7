//! Read-only queries over the points ledger.

use std::sync::Arc;

use crate::domain::PointHistory;
use crate::error::MileageError;
use crate::persistence::Store;

/// Balance lookups. Never writes.
#[derive(Debug, Clone)]
pub struct PointService {
    store: Arc<dyn Store>,
}

impl PointService {
    /// Creates a new `PointService`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Current balance of `user_id`; zero if the user has never been credited.
    ///
    /// # Errors
    ///
    /// Returns [`MileageError::Persistence`] on storage failure.
    pub async fn balance(&self, user_id: &str) -> Result<i64, MileageError> {
        let row = self.store.find_user_point(user_id).await?;
        Ok(row.map_or(0, |r| r.balance))
    }

    /// Every balance movement of `user_id`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`MileageError::Persistence`] on storage failure.
    pub async fn history(&self, user_id: &str) -> Result<Vec<PointHistory>, MileageError> {
        Ok(self.store.list_point_history(user_id).await?)
    }
}
