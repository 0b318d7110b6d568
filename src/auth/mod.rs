//! Authentication module for the admin gate.
//!
//! - Token: issue/verify of signed, time-bounded credentials
//! - Policy: path classification (always-allowed, protected, public)
//! - Gate: per-request decision built on the two above
//! - Middleware: axum adapter that reads the cookie and applies the decision

mod credentials;
mod gate;
mod middleware;
mod policy;
mod token;

pub use credentials::*;
pub use gate::*;
pub use middleware::*;
pub use policy::*;
pub use token::*;
