pub mod listing_model;
pub mod user_model;

// Re-export commonly used types
pub use listing_model::{Listing, ListingPatch, NewListing, Patch};
pub use user_model::{App, User};
