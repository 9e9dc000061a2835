//! Typed client for the reservation REST API
//!
//! The reservation service owns all business logic; this module only
//! consumes its endpoints. Requests ride a cookie-based session, matching
//! the service's authentication model.

pub mod client;
pub mod types;

pub use client::ApiClient;
