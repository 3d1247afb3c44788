//! Client core of a second-hand bike marketplace.
//!
//! The remote backend sits behind [`store::MarketplaceStore`]. Reads go
//! through the [`query::QueryClient`] cache, listings are narrowed with
//! [`filter::filter_listings`], and [`market::Marketplace`] ties these
//! together so every successful write invalidates the reads it affects.

pub mod config;
pub mod filter;
pub mod market;
pub mod models;
pub mod query;
pub mod share;
pub mod store;

pub use filter::{filter_listings, FilterCriteria, FilterForm};
pub use market::Marketplace;
pub use models::{Condition, Listing, ListingFields, Message, PrincipalId};
pub use query::{QueryClient, QueryKey};
pub use store::{HttpStore, MarketplaceStore, MemoryStore, StoreError, StoreResult};
