pub mod listing;

pub use listing::{Listing, LISTING_FIELDS, NOT_AVAILABLE};
