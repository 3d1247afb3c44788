use crate::models::{BlobRef, BuyerProfile, BuyerProfileInput, DocumentKind, UserProfile, UserRole};
use crate::query::QueryKey;
use crate::store::StoreResult;

use super::{invalidation, Marketplace};

impl Marketplace {
    pub async fn my_buyer_profile(&self) -> StoreResult<Option<BuyerProfile>> {
        self.read(QueryKey::MyBuyerProfile, |store| async move {
            store.get_my_buyer_profile().await
        })
        .await
    }

    pub async fn is_buyer_profile_complete(&self) -> StoreResult<bool> {
        self.read(QueryKey::BuyerProfileComplete, |store| async move {
            store.is_buyer_profile_complete().await
        })
        .await
    }

    /// Every buyer profile; admin only on most backends
    pub async fn buyer_profiles(&self) -> StoreResult<Vec<BuyerProfile>> {
        self.read(QueryKey::BuyerProfiles, |store| async move {
            store.get_all_buyer_profiles().await
        })
        .await
    }

    pub async fn create_buyer_profile(&self, input: &BuyerProfileInput) -> StoreResult<()> {
        let result = self.store.create_buyer_profile(input).await;
        self.settle(
            "create_buyer_profile",
            result,
            &invalidation::buyer_profile_changed(),
        )
    }

    pub async fn complete_buyer_profile(&self) -> StoreResult<()> {
        let result = self.store.complete_buyer_profile().await;
        self.settle(
            "complete_buyer_profile",
            result,
            &invalidation::buyer_profile_changed(),
        )
    }

    /// Attach an uploaded document to the caller's buyer profile
    pub async fn upload_document(&self, kind: DocumentKind, blob: &BlobRef) -> StoreResult<()> {
        let result = self.store.upload_buyer_document(kind, blob).await;
        self.settle(
            "upload_document",
            result,
            &invalidation::buyer_document_attached(),
        )
    }

    pub async fn upload_profile_photo(&self, blob: &BlobRef) -> StoreResult<()> {
        self.upload_document(DocumentKind::ProfilePhoto, blob).await
    }

    pub async fn upload_aadhaar_document(&self, blob: &BlobRef) -> StoreResult<()> {
        self.upload_document(DocumentKind::Aadhaar, blob).await
    }

    pub async fn upload_pan_document(&self, blob: &BlobRef) -> StoreResult<()> {
        self.upload_document(DocumentKind::Pan, blob).await
    }

    pub async fn caller_profile(&self) -> StoreResult<Option<UserProfile>> {
        self.read(QueryKey::CallerProfile, |store| async move {
            store.get_caller_user_profile().await
        })
        .await
    }

    pub async fn save_caller_profile(&self, profile: &UserProfile) -> StoreResult<()> {
        let result = self.store.save_caller_user_profile(profile).await;
        self.settle(
            "save_caller_profile",
            result,
            &invalidation::caller_profile_saved(),
        )
    }

    pub async fn caller_role(&self) -> StoreResult<UserRole> {
        self.read(QueryKey::CallerRole, |store| async move {
            store.get_caller_user_role().await
        })
        .await
    }
}
