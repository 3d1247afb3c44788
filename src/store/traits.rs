use async_trait::async_trait;

use crate::models::{
    AnalyticsData, BlobRef, BuyerProfile, BuyerProfileInput, DocumentKind, FounderProfile,
    Listing, ListingFields, Message, PrincipalId, UsageStat, UserProfile, UserRole,
    WebsiteContent,
};

use super::StoreResult;

/// Operations exposed by the remote marketplace backend.
///
/// Calls are made on behalf of one caller identity, fixed when the store
/// handle is built. Implementations map their own failures onto
/// [`StoreError`](super::StoreError) so the query layer can tell a missing
/// record from an unreachable backend.
#[async_trait]
pub trait MarketplaceStore: Send + Sync {
    // Listings

    /// All listings regardless of availability
    async fn get_all_listings(&self) -> StoreResult<Vec<Listing>>;

    /// Listings still for sale
    async fn get_available_listings(&self) -> StoreResult<Vec<Listing>>;

    /// A single listing; `NotFound` when the id is unknown
    async fn get_listing(&self, id: &str) -> StoreResult<Listing>;

    /// Listings owned by the caller
    async fn get_my_listings(&self) -> StoreResult<Vec<Listing>>;

    /// Create a listing owned by the caller and return its id
    async fn create_listing(&self, fields: &ListingFields) -> StoreResult<String>;

    /// Replace every editable field and the availability flag
    async fn update_listing(
        &self,
        id: &str,
        fields: &ListingFields,
        available: bool,
    ) -> StoreResult<()>;

    /// Permanently remove a listing
    async fn delete_listing(&self, id: &str) -> StoreResult<()>;

    async fn search_listings_by_brand(&self, brand: &str) -> StoreResult<Vec<Listing>>;

    async fn search_listings_by_price_range(&self, min: i64, max: i64)
        -> StoreResult<Vec<Listing>>;

    // Messages

    async fn get_messages_for_listing(&self, listing_id: &str) -> StoreResult<Vec<Message>>;

    async fn send_message(
        &self,
        receiver: &PrincipalId,
        content: &str,
        listing_id: &str,
    ) -> StoreResult<()>;

    // Profiles

    async fn get_my_buyer_profile(&self) -> StoreResult<Option<BuyerProfile>>;

    async fn is_buyer_profile_complete(&self) -> StoreResult<bool>;

    async fn get_all_buyer_profiles(&self) -> StoreResult<Vec<BuyerProfile>>;

    async fn get_buyer_profile(&self, user: &PrincipalId) -> StoreResult<Option<BuyerProfile>>;

    async fn create_buyer_profile(&self, input: &BuyerProfileInput) -> StoreResult<()>;

    async fn complete_buyer_profile(&self) -> StoreResult<()>;

    /// Attach an already-uploaded blob to the caller's buyer profile
    async fn upload_buyer_document(&self, kind: DocumentKind, blob: &BlobRef) -> StoreResult<()>;

    async fn get_caller_user_profile(&self) -> StoreResult<Option<UserProfile>>;

    async fn save_caller_user_profile(&self, profile: &UserProfile) -> StoreResult<()>;

    async fn get_caller_user_role(&self) -> StoreResult<UserRole>;

    // Founder and back office

    async fn is_founder(&self) -> StoreResult<bool>;

    async fn get_founder_profile(&self) -> StoreResult<Option<FounderProfile>>;

    async fn update_founder_profile(&self, profile: &FounderProfile) -> StoreResult<()>;

    async fn get_website_content(&self) -> StoreResult<WebsiteContent>;

    async fn update_website_content(&self, content: &WebsiteContent) -> StoreResult<()>;

    async fn get_analytics_data(&self) -> StoreResult<AnalyticsData>;

    async fn add_usage_stat(&self, stat: &UsageStat) -> StoreResult<()>;

    /// Name of the backend, for logs
    fn store_name(&self) -> &'static str;
}
