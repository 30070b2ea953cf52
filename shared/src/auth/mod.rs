//! Authentication primitives shared by both servers: the session token
//! codec and password hashing.

pub mod password;
pub mod token;

pub use token::{Claims, FixedKey, KeySource, TokenCodec};
