//! Data Transfer Objects for REST request/response serialization.
//!
//! Documents are serialized in camelCase; enum values stay snake_case.

pub mod attendance_dto;
pub mod auth_dto;
pub mod common_dto;
pub mod event_dto;

pub use attendance_dto::*;
pub use auth_dto::*;
pub use common_dto::*;
pub use event_dto::*;
