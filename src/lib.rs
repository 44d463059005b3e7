//! # mileage-service
//!
//! REST service that turns place-review events into a per-user points ledger.
//!
//! Each `ADD`, `MOD` or `DELETE` review event changes the review store and
//! the author's balance in one transaction, and every non-zero balance change
//! leaves exactly one history record. A review earns one point for text, one
//! for photos, and one more if it is the first review of its place.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── ReviewService / PointService (service/)
//!     ├── Validation, point rules (domain/)
//!     │
//!     └── Store: PostgreSQL or in-memory (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
