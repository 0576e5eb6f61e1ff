//! Core business logic abstractions

pub mod config;
pub mod listing;
pub mod log;
pub mod quote;
pub mod store;

// Re-export main types for cleaner imports
pub use listing::{Category, Listing, ListingError, NewListing, User};
pub use quote::{FeedError, FeedResult, PriceQuote, QuoteSource};
pub use store::KeyValueStore;
