//! Data Transfer Objects for REST request/response serialization.
//!
//! Field names are camelCase on the wire. Successful responses are wrapped in
//! [`ApiResponse`].

pub mod common_dto;
pub mod event_dto;
pub mod review_dto;
pub mod user_dto;

pub use common_dto::*;
pub use event_dto::*;
pub use review_dto::*;
pub use user_dto::*;
