//! HTTP API layer for the admin gate.
//!
//! Provides login/logout endpoints and wraps every route in the gate.

pub mod handlers;
mod routes;
mod types;

pub use routes::build_router;
