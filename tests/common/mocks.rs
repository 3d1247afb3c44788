use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bike_bazaar::models::{
    AnalyticsData, BlobRef, BuyerProfile, BuyerProfileInput, DocumentKind, FounderProfile,
    Listing, ListingFields, Message, PrincipalId, UsageStat, UserProfile, UserRole,
    WebsiteContent,
};
use bike_bazaar::{MarketplaceStore, MemoryStore, StoreError, StoreResult};

/// Wraps a [`MemoryStore`], counting calls per operation and failing reads or
/// writes on demand.
#[allow(dead_code)]
pub struct InstrumentedStore {
    pub inner: MemoryStore,
    calls: Mutex<HashMap<&'static str, usize>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    read_delay: Mutex<Option<Duration>>,
}

#[allow(dead_code)]
impl InstrumentedStore {
    pub fn new(inner: MemoryStore) -> Arc<Self> {
        Arc::new(Self {
            inner,
            calls: Mutex::new(HashMap::new()),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            read_delay: Mutex::new(None),
        })
    }

    /// Seeded store acting as `seller-ravi`, with `founder` as admin
    pub fn seeded() -> Arc<Self> {
        Self::new(
            MemoryStore::seeded(PrincipalId::new("seller-ravi"))
                .with_founder(PrincipalId::new("founder")),
        )
    }

    pub fn calls(&self, op: &str) -> usize {
        self.calls.lock().unwrap().get(op).copied().unwrap_or(0)
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Hold every read for `delay` before answering
    pub fn delay_reads(&self, delay: Duration) {
        *self.read_delay.lock().unwrap() = Some(delay);
    }

    fn count(&self, op: &'static str) {
        *self.calls.lock().unwrap().entry(op).or_default() += 1;
    }

    async fn read(&self, op: &'static str) -> StoreResult<()> {
        self.count(op);
        let delay = *self.read_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Transport(format!("{op}: connection refused")));
        }
        Ok(())
    }

    fn write(&self, op: &'static str) -> StoreResult<()> {
        self.count(op);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected {
                status: 500,
                message: format!("{op}: backend unavailable"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MarketplaceStore for InstrumentedStore {
    async fn get_all_listings(&self) -> StoreResult<Vec<Listing>> {
        self.read("get_all_listings").await?;
        self.inner.get_all_listings().await
    }

    async fn get_available_listings(&self) -> StoreResult<Vec<Listing>> {
        self.read("get_available_listings").await?;
        self.inner.get_available_listings().await
    }

    async fn get_listing(&self, id: &str) -> StoreResult<Listing> {
        self.read("get_listing").await?;
        self.inner.get_listing(id).await
    }

    async fn get_my_listings(&self) -> StoreResult<Vec<Listing>> {
        self.read("get_my_listings").await?;
        self.inner.get_my_listings().await
    }

    async fn create_listing(&self, fields: &ListingFields) -> StoreResult<String> {
        self.write("create_listing")?;
        self.inner.create_listing(fields).await
    }

    async fn update_listing(
        &self,
        id: &str,
        fields: &ListingFields,
        available: bool,
    ) -> StoreResult<()> {
        self.write("update_listing")?;
        self.inner.update_listing(id, fields, available).await
    }

    async fn delete_listing(&self, id: &str) -> StoreResult<()> {
        self.write("delete_listing")?;
        self.inner.delete_listing(id).await
    }

    async fn search_listings_by_brand(&self, brand: &str) -> StoreResult<Vec<Listing>> {
        self.read("search_listings_by_brand").await?;
        self.inner.search_listings_by_brand(brand).await
    }

    async fn search_listings_by_price_range(
        &self,
        min: i64,
        max: i64,
    ) -> StoreResult<Vec<Listing>> {
        self.read("search_listings_by_price_range").await?;
        self.inner.search_listings_by_price_range(min, max).await
    }

    async fn get_messages_for_listing(&self, listing_id: &str) -> StoreResult<Vec<Message>> {
        self.read("get_messages_for_listing").await?;
        self.inner.get_messages_for_listing(listing_id).await
    }

    async fn send_message(
        &self,
        receiver: &PrincipalId,
        content: &str,
        listing_id: &str,
    ) -> StoreResult<()> {
        self.write("send_message")?;
        self.inner.send_message(receiver, content, listing_id).await
    }

    async fn get_my_buyer_profile(&self) -> StoreResult<Option<BuyerProfile>> {
        self.read("get_my_buyer_profile").await?;
        self.inner.get_my_buyer_profile().await
    }

    async fn is_buyer_profile_complete(&self) -> StoreResult<bool> {
        self.read("is_buyer_profile_complete").await?;
        self.inner.is_buyer_profile_complete().await
    }

    async fn get_all_buyer_profiles(&self) -> StoreResult<Vec<BuyerProfile>> {
        self.read("get_all_buyer_profiles").await?;
        self.inner.get_all_buyer_profiles().await
    }

    async fn get_buyer_profile(&self, user: &PrincipalId) -> StoreResult<Option<BuyerProfile>> {
        self.read("get_buyer_profile").await?;
        self.inner.get_buyer_profile(user).await
    }

    async fn create_buyer_profile(&self, input: &BuyerProfileInput) -> StoreResult<()> {
        self.write("create_buyer_profile")?;
        self.inner.create_buyer_profile(input).await
    }

    async fn complete_buyer_profile(&self) -> StoreResult<()> {
        self.write("complete_buyer_profile")?;
        self.inner.complete_buyer_profile().await
    }

    async fn upload_buyer_document(&self, kind: DocumentKind, blob: &BlobRef) -> StoreResult<()> {
        self.write("upload_buyer_document")?;
        self.inner.upload_buyer_document(kind, blob).await
    }

    async fn get_caller_user_profile(&self) -> StoreResult<Option<UserProfile>> {
        self.read("get_caller_user_profile").await?;
        self.inner.get_caller_user_profile().await
    }

    async fn save_caller_user_profile(&self, profile: &UserProfile) -> StoreResult<()> {
        self.write("save_caller_user_profile")?;
        self.inner.save_caller_user_profile(profile).await
    }

    async fn get_caller_user_role(&self) -> StoreResult<UserRole> {
        self.read("get_caller_user_role").await?;
        self.inner.get_caller_user_role().await
    }

    async fn is_founder(&self) -> StoreResult<bool> {
        self.read("is_founder").await?;
        self.inner.is_founder().await
    }

    async fn get_founder_profile(&self) -> StoreResult<Option<FounderProfile>> {
        self.read("get_founder_profile").await?;
        self.inner.get_founder_profile().await
    }

    async fn update_founder_profile(&self, profile: &FounderProfile) -> StoreResult<()> {
        self.write("update_founder_profile")?;
        self.inner.update_founder_profile(profile).await
    }

    async fn get_website_content(&self) -> StoreResult<WebsiteContent> {
        self.read("get_website_content").await?;
        self.inner.get_website_content().await
    }

    async fn update_website_content(&self, content: &WebsiteContent) -> StoreResult<()> {
        self.write("update_website_content")?;
        self.inner.update_website_content(content).await
    }

    async fn get_analytics_data(&self) -> StoreResult<AnalyticsData> {
        self.read("get_analytics_data").await?;
        self.inner.get_analytics_data().await
    }

    async fn add_usage_stat(&self, stat: &UsageStat) -> StoreResult<()> {
        self.write("add_usage_stat")?;
        self.inner.add_usage_stat(stat).await
    }

    fn store_name(&self) -> &'static str {
        "instrumented"
    }
}
