//! Typed client for the attendance backend's REST API.
//!
//! [`ApiClient`] wraps `reqwest`, injects the session bearer token into every
//! outgoing request, and exposes one typed resource handle per endpoint group
//! (`auth`, `users`, `devices`, `attendance`). Every failure surfaces as a
//! single [`ApiError`] so callers never inspect response shapes themselves.

pub mod error;
pub mod models;
pub mod params;
pub mod resources;
pub mod session;

mod client;

pub use client::ApiClient;
pub use error::ApiError;
