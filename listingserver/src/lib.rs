//! Listings server library.
//!
//! Exposes the generated proto module and the service layers for the
//! binary and for integration tests.

// Generated proto code
pub mod listings {
    tonic::include_proto!("listings");
}

pub mod config;
pub mod controller;
pub mod service;
pub mod storage;
