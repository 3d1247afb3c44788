use std::sync::Arc;

use crate::models::{
    ActivityEntry, AnalyticsData, DashboardMetrics, FounderProfile, UsageStat, WebsiteContent,
};
use crate::query::{PollHandle, QueryKey};
use crate::store::{MarketplaceStore, StoreError, StoreResult};

use super::{invalidation, Marketplace};

impl Marketplace {
    pub async fn is_founder(&self) -> StoreResult<bool> {
        self.read(QueryKey::IsFounder, |store| async move {
            store.is_founder().await
        })
        .await
    }

    pub async fn founder_profile(&self) -> StoreResult<Option<FounderProfile>> {
        self.read(QueryKey::FounderProfile, |store| async move {
            store.get_founder_profile().await
        })
        .await
    }

    pub async fn update_founder_profile(&self, profile: &FounderProfile) -> StoreResult<()> {
        let result = self.store.update_founder_profile(profile).await;
        self.settle(
            "update_founder_profile",
            result,
            &invalidation::founder_profile_updated(),
        )
    }

    pub async fn website_content(&self) -> StoreResult<WebsiteContent> {
        self.read(QueryKey::WebsiteContent, |store| async move {
            store.get_website_content().await
        })
        .await
    }

    pub async fn update_website_content(&self, content: &WebsiteContent) -> StoreResult<()> {
        let result = self.store.update_website_content(content).await;
        self.settle(
            "update_website_content",
            result,
            &invalidation::website_content_updated(),
        )
    }

    pub async fn analytics(&self) -> StoreResult<AnalyticsData> {
        self.read(QueryKey::AnalyticsData, |store| async move {
            store.get_analytics_data().await
        })
        .await
    }

    pub async fn add_usage_stat(&self, stat: &UsageStat) -> StoreResult<()> {
        let result = self.store.add_usage_stat(stat).await;
        self.settle("add_usage_stat", result, &invalidation::usage_stat_added())
    }

    /// Dashboard numbers; listings and buyer profiles are fetched concurrently
    pub async fn dashboard_metrics(&self) -> StoreResult<DashboardMetrics> {
        self.read(QueryKey::DashboardMetrics, fetch_dashboard).await
    }

    /// Latest listing events for the admin feed
    pub async fn recent_activity(&self) -> StoreResult<Vec<ActivityEntry>> {
        self.read(QueryKey::RecentActivity, |store| async move {
            let listings = store.get_all_listings().await?;
            Ok::<_, StoreError>(ActivityEntry::recent(&listings))
        })
        .await
    }

    /// Keep dashboard numbers refreshed until the handle is dropped
    pub fn watch_dashboard(&self) -> PollHandle {
        self.watch(QueryKey::DashboardMetrics, fetch_dashboard)
    }

    /// Keep analytics refreshed until the handle is dropped
    pub fn watch_analytics(&self) -> PollHandle {
        self.watch(QueryKey::AnalyticsData, |store| async move {
            store.get_analytics_data().await
        })
    }
}

async fn fetch_dashboard(store: Arc<dyn MarketplaceStore>) -> StoreResult<DashboardMetrics> {
    let (listings, buyers) =
        futures::try_join!(store.get_all_listings(), store.get_all_buyer_profiles())?;
    Ok(DashboardMetrics::compute(&listings, &buyers))
}
