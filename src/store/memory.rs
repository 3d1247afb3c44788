use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

use crate::models::{
    AnalyticsData, BlobRef, BuyerProfile, BuyerProfileInput, Condition, DocumentKind,
    FounderProfile, Listing, ListingFields, Message, PrincipalId, UsageStat, UserProfile,
    UserRole, WebsiteContent,
};

use super::traits::MarketplaceStore;
use super::{StoreError, StoreResult};

#[derive(Default)]
struct State {
    listings: Vec<Listing>,
    messages: Vec<Message>,
    buyer_profiles: HashMap<PrincipalId, BuyerProfile>,
    user_profiles: HashMap<PrincipalId, UserProfile>,
    founder: Option<PrincipalId>,
    founder_profile: Option<FounderProfile>,
    content: WebsiteContent,
    usage_stats: Vec<UsageStat>,
    next_listing: u64,
    next_message: u64,
}

/// In-process marketplace backend.
///
/// Handles created with [`MemoryStore::as_caller`] share state, so one store
/// can stand in for the backend seen by several users.
#[derive(Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    caller: PrincipalId,
}

impl MemoryStore {
    /// Create an empty store acting on behalf of `caller`
    pub fn new(caller: PrincipalId) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            caller,
        }
    }

    /// Create a store pre-filled with demo listings from a couple of sellers
    pub fn seeded(caller: PrincipalId) -> Self {
        let store = Self::new(caller);
        {
            let mut state = store.lock();
            for (seller, fields, available) in demo_listings() {
                let id = next_listing_id(&mut state);
                let listed_at = Utc::now() - Duration::days(state.next_listing as i64);
                let mut listing = Listing::new(id, seller, fields, listed_at);
                listing.available = available;
                state.listings.push(listing);
            }
            state.content = WebsiteContent {
                hero_section: "Find your next ride".to_string(),
                about_page: "Bike Bazaar connects second-hand bike buyers and sellers.".to_string(),
                footer_info: "Bike Bazaar".to_string(),
            };
        }
        info!("📋 Seeded memory store with {} demo listings", store.lock().listings.len());
        store
    }

    /// Another handle on the same state, acting as a different caller
    pub fn as_caller(&self, caller: PrincipalId) -> Self {
        Self {
            state: Arc::clone(&self.state),
            caller,
        }
    }

    /// Make `founder` the founder and sole admin of the marketplace
    pub fn with_founder(self, founder: PrincipalId) -> Self {
        self.lock().founder = Some(founder);
        self
    }

    pub fn caller(&self) -> &PrincipalId {
        &self.caller
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!(store = "memory", "Recovered from poisoned store lock");
                poisoned.into_inner()
            }
        }
    }

    fn is_admin(&self, state: &State) -> bool {
        state.founder.as_ref() == Some(&self.caller)
    }

    fn require_admin(&self, state: &State) -> StoreResult<()> {
        if self.is_admin(state) {
            Ok(())
        } else {
            Err(StoreError::forbidden("only the founder may do this"))
        }
    }

    fn listing_mut<'a>(&self, state: &'a mut State, id: &str) -> StoreResult<&'a mut Listing> {
        let is_admin = self.is_admin(state);
        let listing = state
            .listings
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| StoreError::not_found(format!("listing {id}")))?;
        if listing.seller != self.caller && !is_admin {
            return Err(StoreError::forbidden(format!(
                "listing {id} belongs to another seller"
            )));
        }
        Ok(listing)
    }

    fn my_buyer_profile_mut<'a>(&self, state: &'a mut State) -> StoreResult<&'a mut BuyerProfile> {
        state
            .buyer_profiles
            .get_mut(&self.caller)
            .ok_or_else(|| StoreError::not_found(format!("buyer profile for {}", self.caller)))
    }
}

fn next_listing_id(state: &mut State) -> String {
    state.next_listing += 1;
    format!("listing-{}", state.next_listing)
}

#[async_trait]
impl MarketplaceStore for MemoryStore {
    async fn get_all_listings(&self) -> StoreResult<Vec<Listing>> {
        Ok(self.lock().listings.clone())
    }

    async fn get_available_listings(&self) -> StoreResult<Vec<Listing>> {
        Ok(self
            .lock()
            .listings
            .iter()
            .filter(|l| l.available)
            .cloned()
            .collect())
    }

    async fn get_listing(&self, id: &str) -> StoreResult<Listing> {
        self.lock()
            .listings
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("listing {id}")))
    }

    async fn get_my_listings(&self) -> StoreResult<Vec<Listing>> {
        Ok(self
            .lock()
            .listings
            .iter()
            .filter(|l| l.seller == self.caller)
            .cloned()
            .collect())
    }

    async fn create_listing(&self, fields: &ListingFields) -> StoreResult<String> {
        fields.validate()?;
        let mut state = self.lock();
        let id = next_listing_id(&mut state);
        let listing = Listing::new(id.clone(), self.caller.clone(), fields.clone(), Utc::now());
        state.listings.push(listing);
        debug!(listing_id = %id, seller = %self.caller, "Stored new listing");
        Ok(id)
    }

    async fn update_listing(
        &self,
        id: &str,
        fields: &ListingFields,
        available: bool,
    ) -> StoreResult<()> {
        fields.validate()?;
        let mut state = self.lock();
        self.listing_mut(&mut state, id)?.apply(fields.clone(), available);
        Ok(())
    }

    async fn delete_listing(&self, id: &str) -> StoreResult<()> {
        let mut state = self.lock();
        self.listing_mut(&mut state, id)?;
        state.listings.retain(|l| l.id != id);
        state.messages.retain(|m| m.listing_id != id);
        Ok(())
    }

    async fn search_listings_by_brand(&self, brand: &str) -> StoreResult<Vec<Listing>> {
        let needle = brand.to_lowercase();
        Ok(self
            .lock()
            .listings
            .iter()
            .filter(|l| l.brand.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn search_listings_by_price_range(
        &self,
        min: i64,
        max: i64,
    ) -> StoreResult<Vec<Listing>> {
        Ok(self
            .lock()
            .listings
            .iter()
            .filter(|l| (min..=max).contains(&l.price))
            .cloned()
            .collect())
    }

    async fn get_messages_for_listing(&self, listing_id: &str) -> StoreResult<Vec<Message>> {
        Ok(self
            .lock()
            .messages
            .iter()
            .filter(|m| m.listing_id == listing_id)
            .cloned()
            .collect())
    }

    async fn send_message(
        &self,
        receiver: &PrincipalId,
        content: &str,
        listing_id: &str,
    ) -> StoreResult<()> {
        if content.trim().is_empty() {
            return Err(StoreError::Validation("message is empty".to_string()));
        }
        let mut state = self.lock();
        if !state.listings.iter().any(|l| l.id == listing_id) {
            return Err(StoreError::not_found(format!("listing {listing_id}")));
        }
        state.next_message += 1;
        let message = Message {
            id: format!("message-{}", state.next_message),
            listing_id: listing_id.to_string(),
            sender: self.caller.clone(),
            receiver: receiver.clone(),
            content: content.to_string(),
            sent_at: Utc::now(),
        };
        state.messages.push(message);
        Ok(())
    }

    async fn get_my_buyer_profile(&self) -> StoreResult<Option<BuyerProfile>> {
        Ok(self.lock().buyer_profiles.get(&self.caller).cloned())
    }

    async fn is_buyer_profile_complete(&self) -> StoreResult<bool> {
        Ok(self
            .lock()
            .buyer_profiles
            .get(&self.caller)
            .is_some_and(|p| p.is_profile_complete))
    }

    async fn get_all_buyer_profiles(&self) -> StoreResult<Vec<BuyerProfile>> {
        let state = self.lock();
        self.require_admin(&state)?;
        let mut profiles: Vec<_> = state.buyer_profiles.iter().collect();
        profiles.sort_by(|a, b| a.0.cmp(b.0));
        Ok(profiles.into_iter().map(|(_, p)| p.clone()).collect())
    }

    async fn get_buyer_profile(&self, user: &PrincipalId) -> StoreResult<Option<BuyerProfile>> {
        Ok(self.lock().buyer_profiles.get(user).cloned())
    }

    async fn create_buyer_profile(&self, input: &BuyerProfileInput) -> StoreResult<()> {
        let mut state = self.lock();
        if state.buyer_profiles.contains_key(&self.caller) {
            return Err(StoreError::Rejected {
                status: 409,
                message: format!("buyer profile for {} already exists", self.caller),
            });
        }
        state
            .buyer_profiles
            .insert(self.caller.clone(), BuyerProfile::new(input.clone(), Utc::now()));
        Ok(())
    }

    async fn complete_buyer_profile(&self) -> StoreResult<()> {
        let mut state = self.lock();
        self.my_buyer_profile_mut(&mut state)?.is_profile_complete = true;
        Ok(())
    }

    async fn upload_buyer_document(&self, kind: DocumentKind, blob: &BlobRef) -> StoreResult<()> {
        let mut state = self.lock();
        *self.my_buyer_profile_mut(&mut state)?.document_mut(kind) = Some(blob.clone());
        Ok(())
    }

    async fn get_caller_user_profile(&self) -> StoreResult<Option<UserProfile>> {
        Ok(self.lock().user_profiles.get(&self.caller).cloned())
    }

    async fn save_caller_user_profile(&self, profile: &UserProfile) -> StoreResult<()> {
        self.lock()
            .user_profiles
            .insert(self.caller.clone(), profile.clone());
        Ok(())
    }

    async fn get_caller_user_role(&self) -> StoreResult<UserRole> {
        let state = self.lock();
        Ok(if self.is_admin(&state) {
            UserRole::Admin
        } else {
            UserRole::User
        })
    }

    async fn is_founder(&self) -> StoreResult<bool> {
        Ok(self.is_admin(&self.lock()))
    }

    async fn get_founder_profile(&self) -> StoreResult<Option<FounderProfile>> {
        Ok(self.lock().founder_profile.clone())
    }

    async fn update_founder_profile(&self, profile: &FounderProfile) -> StoreResult<()> {
        let mut state = self.lock();
        self.require_admin(&state)?;
        state.founder_profile = Some(profile.clone());
        Ok(())
    }

    async fn get_website_content(&self) -> StoreResult<WebsiteContent> {
        Ok(self.lock().content.clone())
    }

    async fn update_website_content(&self, content: &WebsiteContent) -> StoreResult<()> {
        let mut state = self.lock();
        self.require_admin(&state)?;
        state.content = content.clone();
        Ok(())
    }

    async fn get_analytics_data(&self) -> StoreResult<AnalyticsData> {
        let state = self.lock();
        self.require_admin(&state)?;
        Ok(AnalyticsData {
            active_listings: state.listings.iter().filter(|l| l.available).count() as u64,
            total_visitors: state.usage_stats.iter().map(|s| s.visitors).sum(),
            registered_users: state.buyer_profiles.len() as u64,
            usage_stats: state.usage_stats.clone(),
        })
    }

    async fn add_usage_stat(&self, stat: &UsageStat) -> StoreResult<()> {
        let mut state = self.lock();
        self.require_admin(&state)?;
        state.usage_stats.push(stat.clone());
        Ok(())
    }

    fn store_name(&self) -> &'static str {
        "memory"
    }
}

/// Demo catalogue used by [`MemoryStore::seeded`]
fn demo_listings() -> Vec<(PrincipalId, ListingFields, bool)> {
    let ravi = PrincipalId::new("seller-ravi");
    let meera = PrincipalId::new("seller-meera");

    let bike = |title: &str,
                brand: &str,
                model: &str,
                year: i32,
                price: i64,
                mileage: Option<i64>,
                condition: Condition,
                description: &str,
                contact_info: &str| ListingFields {
        title: title.to_string(),
        brand: brand.to_string(),
        model: model.to_string(),
        year,
        price,
        mileage,
        condition,
        description: description.to_string(),
        contact_info: contact_info.to_string(),
    };

    vec![
        (
            ravi.clone(),
            bike(
                "2020 Honda CB Shine - single owner",
                "Honda",
                "CB Shine",
                2020,
                50_000,
                Some(18_500),
                Condition::Good,
                "Serviced every 3000 km, new tyres.",
                "ravi@example.com",
            ),
            true,
        ),
        (
            meera.clone(),
            bike(
                "Yamaha R15 V4 racing blue",
                "Yamaha",
                "R15 V4",
                2022,
                80_000,
                Some(9_200),
                Condition::Excellent,
                "Garage kept, all papers clear.",
                "+91 98200 11223",
            ),
            true,
        ),
        (
            ravi.clone(),
            bike(
                "Royal Enfield Classic 350",
                "Royal Enfield",
                "Classic 350",
                2018,
                120_000,
                Some(32_000),
                Condition::Good,
                "Chrome tank, touring seat fitted.",
                "ravi@example.com",
            ),
            true,
        ),
        (
            meera,
            bike(
                "Bajaj Pulsar 150 city commuter",
                "Bajaj",
                "Pulsar 150",
                2016,
                35_000,
                None,
                Condition::Fair,
                "Runs well, minor scratches.",
                "+91 98200 11223",
            ),
            false,
        ),
        (
            ravi,
            bike(
                "KTM Duke 200",
                "KTM",
                "Duke 200",
                2021,
                140_000,
                Some(11_000),
                Condition::Excellent,
                "Upgraded exhaust, stock part included.",
                "ravi@example.com",
            ),
            true,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(price: i64) -> ListingFields {
        ListingFields {
            title: "TVS Apache RTR 160".to_string(),
            brand: "TVS".to_string(),
            model: "Apache RTR 160".to_string(),
            year: 2019,
            price,
            mileage: None,
            condition: Condition::Good,
            description: String::new(),
            contact_info: "seller@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn seeded_store_hides_sold_listings_from_available() {
        let store = MemoryStore::seeded(PrincipalId::new("buyer"));
        let all = store.get_all_listings().await.unwrap();
        let available = store.get_available_listings().await.unwrap();
        assert_eq!(all.len(), 5);
        assert_eq!(available.len(), 4);
    }

    #[tokio::test]
    async fn missing_listing_is_not_found() {
        let store = MemoryStore::new(PrincipalId::new("buyer"));
        let err = store.get_listing("nope").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn only_the_seller_may_update() {
        let seller = MemoryStore::new(PrincipalId::new("seller"));
        let id = seller.create_listing(&fields(60_000)).await.unwrap();
        let stranger = seller.as_caller(PrincipalId::new("stranger"));

        let err = stranger
            .update_listing(&id, &fields(1), false)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected { status: 403, .. }));

        seller.update_listing(&id, &fields(55_000), false).await.unwrap();
        let listing = seller.get_listing(&id).await.unwrap();
        assert_eq!(listing.price, 55_000);
        assert!(!listing.available);
        assert_eq!(listing.seller, PrincipalId::new("seller"));
    }

    #[tokio::test]
    async fn rejects_invalid_price() {
        let store = MemoryStore::new(PrincipalId::new("seller"));
        let err = store.create_listing(&fields(0)).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[tokio::test]
    async fn messages_require_an_existing_listing() {
        let store = MemoryStore::new(PrincipalId::new("buyer"));
        let err = store
            .send_message(&PrincipalId::new("seller"), "still available?", "listing-9")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn back_office_is_founder_only() {
        let founder = PrincipalId::new("founder");
        let store = MemoryStore::new(founder.clone()).with_founder(founder);
        let visitor = store.as_caller(PrincipalId::new("visitor"));

        assert!(store.is_founder().await.unwrap());
        assert_eq!(store.get_caller_user_role().await.unwrap(), UserRole::Admin);
        assert!(!visitor.is_founder().await.unwrap());
        assert!(visitor
            .update_website_content(&WebsiteContent::default())
            .await
            .is_err());
    }
}
