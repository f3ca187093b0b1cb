//! Headless controller layer for the attendance admin console.
//!
//! Holds everything with behavioral contract and nothing presentational:
//! the auth gate state machine, the keyed query cache with stale-response
//! suppression, the list-filter-paginate controllers, and the per-entity
//! mutation flows. The binary in `main.rs` is a thin shell over these.

pub mod cache;
pub mod controller;
pub mod gate;
pub mod views;
