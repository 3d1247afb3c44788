//! Which cached reads each successful mutation makes stale.

use crate::query::{Invalidate, KeyFamily, QueryKey};

/// A new listing shows up in every collection read and in the dashboard.
pub fn listing_created() -> Vec<Invalidate> {
    vec![
        KeyFamily::Listings.into(),
        QueryKey::DashboardMetrics.into(),
        QueryKey::RecentActivity.into(),
    ]
}

/// Update, availability toggle and delete also touch the listing itself.
pub fn listing_changed(id: &str) -> Vec<Invalidate> {
    let mut targets = listing_created();
    targets.push(QueryKey::Listing(id.to_string()).into());
    targets
}

pub fn message_sent(listing_id: &str) -> Vec<Invalidate> {
    vec![QueryKey::Messages(listing_id.to_string()).into()]
}

pub fn buyer_profile_changed() -> Vec<Invalidate> {
    vec![
        QueryKey::MyBuyerProfile.into(),
        QueryKey::BuyerProfileComplete.into(),
        QueryKey::BuyerProfiles.into(),
        QueryKey::DashboardMetrics.into(),
    ]
}

pub fn buyer_document_attached() -> Vec<Invalidate> {
    vec![QueryKey::MyBuyerProfile.into(), QueryKey::BuyerProfiles.into()]
}

pub fn caller_profile_saved() -> Vec<Invalidate> {
    vec![QueryKey::CallerProfile.into()]
}

pub fn founder_profile_updated() -> Vec<Invalidate> {
    vec![QueryKey::FounderProfile.into()]
}

pub fn website_content_updated() -> Vec<Invalidate> {
    vec![QueryKey::WebsiteContent.into()]
}

pub fn usage_stat_added() -> Vec<Invalidate> {
    vec![QueryKey::AnalyticsData.into()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hits(targets: &[Invalidate], key: &QueryKey) -> bool {
        targets.iter().any(|t| t.matches(key))
    }

    #[test]
    fn creating_a_listing_invalidates_catalogue_reads() {
        let targets = listing_created();
        assert!(hits(&targets, &QueryKey::Listings));
        assert!(hits(&targets, &QueryKey::AvailableListings));
        assert!(hits(&targets, &QueryKey::MyListings));
        assert!(hits(&targets, &QueryKey::ListingsByBrand("honda".to_string())));
        assert!(!hits(&targets, &QueryKey::Messages("listing-1".to_string())));
    }

    #[test]
    fn changing_a_listing_invalidates_only_that_listing() {
        let targets = listing_changed("listing-1");
        assert!(hits(&targets, &QueryKey::Listing("listing-1".to_string())));
        assert!(!hits(&targets, &QueryKey::Listing("listing-2".to_string())));
        assert!(hits(&targets, &QueryKey::AvailableListings));
    }

    #[test]
    fn messages_are_scoped_to_their_listing() {
        let targets = message_sent("listing-1");
        assert!(hits(&targets, &QueryKey::Messages("listing-1".to_string())));
        assert!(!hits(&targets, &QueryKey::Messages("listing-2".to_string())));
        assert!(!hits(&targets, &QueryKey::Listings));
    }
}
