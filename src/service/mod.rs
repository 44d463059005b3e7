//! Service layer: business logic orchestration.
//!
//! [`ReviewService`] turns review events into review mutations and ledger
//! movements, one unit of work per event. [`PointService`] answers balance
//! queries. Both share the [`apply_point_delta`] ledger rule set.

pub mod ledger;
pub mod point_service;
pub mod review_service;

pub use ledger::apply_point_delta;
pub use point_service::PointService;
pub use review_service::ReviewService;
