pub mod listing_service;

pub use listing_service::{ListingProvider, ListingSaver, ListingService};
