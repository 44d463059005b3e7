//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::persistence::Store;
use crate::service::{PointService, ReviewService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Review event engine.
    pub review_service: Arc<ReviewService>,
    /// Balance queries.
    pub point_service: Arc<PointService>,
    /// Backing store, used directly for health checks.
    pub store: Arc<dyn Store>,
}

impl AppState {
    /// Wires both services over one store.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            review_service: Arc::new(ReviewService::new(Arc::clone(&store))),
            point_service: Arc::new(PointService::new(Arc::clone(&store))),
            store,
        }
    }
}
