//! Common library for the e-commerce backend services.
//!
//! Holds the pieces both servers depend on: the error taxonomy with its
//! gRPC status mapping, the session token codec, password hashing helpers
//! and the domain models.

pub mod auth;
pub mod model;
pub mod tool;

pub use auth::token::{Claims, FixedKey, KeySource, TokenCodec};
pub use tool::error::AppError;
