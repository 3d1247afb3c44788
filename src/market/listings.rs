use tracing::{debug, warn};

use crate::filter::{filter_listings, FilterCriteria};
use crate::models::{Listing, ListingFields, Message, PrincipalId};
use crate::query::{PollHandle, QueryKey};
use crate::store::StoreResult;

use super::{invalidation, Marketplace};

impl Marketplace {
    /// All listings regardless of availability
    pub async fn all_listings(&self) -> StoreResult<Vec<Listing>> {
        self.read(QueryKey::Listings, |store| async move {
            store.get_all_listings().await
        })
        .await
    }

    /// Listings still for sale
    pub async fn available_listings(&self) -> StoreResult<Vec<Listing>> {
        self.read(QueryKey::AvailableListings, |store| async move {
            store.get_available_listings().await
        })
        .await
    }

    /// A single listing; `NotFound` when the id does not exist
    pub async fn listing(&self, id: &str) -> StoreResult<Listing> {
        let id = id.to_string();
        self.read(QueryKey::Listing(id.clone()), |store| async move {
            store.get_listing(&id).await
        })
        .await
    }

    /// Listings owned by the caller
    pub async fn my_listings(&self) -> StoreResult<Vec<Listing>> {
        self.read(QueryKey::MyListings, |store| async move {
            store.get_my_listings().await
        })
        .await
    }

    /// Server-side brand search
    pub async fn search_by_brand(&self, brand: &str) -> StoreResult<Vec<Listing>> {
        let brand = brand.trim().to_string();
        self.read(QueryKey::ListingsByBrand(brand.clone()), |store| async move {
            store.search_listings_by_brand(&brand).await
        })
        .await
    }

    /// Server-side inclusive price search
    pub async fn search_by_price_range(&self, min: i64, max: i64) -> StoreResult<Vec<Listing>> {
        self.read(
            QueryKey::ListingsByPriceRange { min, max },
            move |store| async move { store.search_listings_by_price_range(min, max).await },
        )
        .await
    }

    /// Available listings narrowed by `criteria` on the client
    pub async fn browse(&self, criteria: &FilterCriteria) -> StoreResult<Vec<Listing>> {
        let listings = self.available_listings().await?;
        let matched = filter_listings(&listings, criteria);
        debug!(total = listings.len(), matched = matched.len(), "Filtered listings");
        Ok(matched)
    }

    pub async fn create_listing(&self, fields: &ListingFields) -> StoreResult<String> {
        fields
            .validate()
            .inspect_err(|err| warn!(op = "create_listing", error = %err, "Rejected listing"))?;
        let result = self.store.create_listing(fields).await;
        self.settle("create_listing", result, &invalidation::listing_created())
    }

    /// Replace every editable field of listing `id` and set its availability
    pub async fn update_listing(
        &self,
        id: &str,
        fields: &ListingFields,
        available: bool,
    ) -> StoreResult<()> {
        fields
            .validate()
            .inspect_err(|err| warn!(op = "update_listing", error = %err, "Rejected listing"))?;
        let result = self.store.update_listing(id, fields, available).await;
        self.settle("update_listing", result, &invalidation::listing_changed(id))
    }

    /// Flip availability of `listing`, resubmitting every other field as-is.
    ///
    /// Returns the new availability.
    pub async fn toggle_availability(&self, listing: &Listing) -> StoreResult<bool> {
        let available = !listing.available;
        let result = self
            .store
            .update_listing(&listing.id, &listing.fields(), available)
            .await;
        self.settle(
            "toggle_availability",
            result,
            &invalidation::listing_changed(&listing.id),
        )?;
        Ok(available)
    }

    pub async fn delete_listing(&self, id: &str) -> StoreResult<()> {
        let result = self.store.delete_listing(id).await;
        self.settle("delete_listing", result, &invalidation::listing_changed(id))
    }

    /// Message thread for a listing
    pub async fn messages_for_listing(&self, listing_id: &str) -> StoreResult<Vec<Message>> {
        let listing_id = listing_id.to_string();
        self.read(QueryKey::Messages(listing_id.clone()), |store| async move {
            store.get_messages_for_listing(&listing_id).await
        })
        .await
    }

    /// Keep a listing's thread refreshed until the handle is dropped
    pub fn watch_messages(&self, listing_id: &str) -> PollHandle {
        let listing_id = listing_id.to_string();
        self.watch(QueryKey::Messages(listing_id.clone()), move |store| {
            let listing_id = listing_id.clone();
            async move { store.get_messages_for_listing(&listing_id).await }
        })
    }

    pub async fn send_message(
        &self,
        receiver: &PrincipalId,
        content: &str,
        listing_id: &str,
    ) -> StoreResult<()> {
        let result = self.store.send_message(receiver, content, listing_id).await;
        self.settle("send_message", result, &invalidation::message_sent(listing_id))
    }
}
