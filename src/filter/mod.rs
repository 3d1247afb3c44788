//! Client-side listing filter.
//!
//! Every predicate is optional and they combine with AND. Input order is
//! preserved; nothing is re-sorted.

pub mod types;

pub use types::{FilterCriteria, FilterForm, ALL_CONDITIONS};

use crate::models::Listing;
use types::text_term;

/// Return the listings matching every predicate in `criteria`, in input order.
pub fn filter_listings(listings: &[Listing], criteria: &FilterCriteria) -> Vec<Listing> {
    let query = text_term(&criteria.query).map(str::to_lowercase);
    let brand = text_term(&criteria.brand).map(str::to_lowercase);

    listings
        .iter()
        .filter(|listing| matches_prepared(listing, criteria, query.as_deref(), brand.as_deref()))
        .cloned()
        .collect()
}

/// Whether a single listing satisfies all of `criteria`.
pub fn matches(listing: &Listing, criteria: &FilterCriteria) -> bool {
    let query = text_term(&criteria.query).map(str::to_lowercase);
    let brand = text_term(&criteria.brand).map(str::to_lowercase);
    matches_prepared(listing, criteria, query.as_deref(), brand.as_deref())
}

// `query` and `brand` are already lowercased.
fn matches_prepared(
    listing: &Listing,
    criteria: &FilterCriteria,
    query: Option<&str>,
    brand: Option<&str>,
) -> bool {
    let matches_search = query.map_or(true, |q| {
        contains_folded(&listing.title, q)
            || contains_folded(&listing.brand, q)
            || contains_folded(&listing.model, q)
    });

    let matches_price = within(listing.price, criteria.min_price, criteria.max_price);
    let matches_year = within(listing.year, criteria.min_year, criteria.max_year);

    let matches_condition = criteria
        .condition
        .map_or(true, |condition| condition == listing.condition);

    let matches_brand = brand.map_or(true, |b| contains_folded(&listing.brand, b));

    matches_search && matches_price && matches_year && matches_condition && matches_brand
}

fn contains_folded(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

fn within<T: PartialOrd>(value: T, min: Option<T>, max: Option<T>) -> bool {
    min.map_or(true, |min| value >= min) && max.map_or(true, |max| value <= max)
}
