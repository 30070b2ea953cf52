//! SSO server library.
//!
//! Exposes the generated proto module and the service layers for the
//! binary and for integration tests.

// Generated proto code
pub mod sso {
    tonic::include_proto!("sso");
}

pub mod config;
pub mod controller;
pub mod service;
pub mod storage;
