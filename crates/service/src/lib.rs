//! Service layer providing business-oriented operations on top of models.
//! - Separates business logic from data access.
//! - Reuses validation and entity definitions in the `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod actor;
pub mod auth;
pub mod booking_service;
pub mod catalog_service;
pub mod errors;
pub mod notification_service;
pub mod pagination;
pub mod payment_service;
#[cfg(test)]
pub mod test_support;
pub mod user_service;
pub mod vendor_service;
