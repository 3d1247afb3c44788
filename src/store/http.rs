use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::models::{
    AnalyticsData, BlobRef, BuyerProfile, BuyerProfileInput, DocumentKind, FounderProfile,
    Listing, ListingFields, Message, PrincipalId, UsageStat, UserProfile, UserRole,
    WebsiteContent,
};

use super::traits::MarketplaceStore;
use super::{StoreError, StoreResult};

/// JSON-over-HTTP client for the marketplace backend
#[derive(Clone)]
pub struct HttpStore {
    client: Client,
    base_url: Url,
    caller_token: Option<String>,
}

#[derive(Deserialize)]
struct CreatedListing {
    id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateListingBody<'a> {
    #[serde(flatten)]
    fields: &'a ListingFields,
    available: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageBody<'a> {
    receiver: &'a PrincipalId,
    content: &'a str,
    listing_id: &'a str,
}

#[derive(Serialize)]
struct DocumentBody<'a> {
    blob: &'a BlobRef,
}

#[derive(Deserialize)]
struct Flag {
    value: bool,
}

#[derive(Deserialize)]
struct Role {
    role: UserRole,
}

impl HttpStore {
    /// Create a client for the backend at `base_url`.
    ///
    /// No request timeout is applied unless one is given.
    pub fn new(
        base_url: &str,
        caller_token: Option<String>,
        timeout: Option<Duration>,
    ) -> StoreResult<Self> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| StoreError::Validation(format!("invalid store URL {base_url}: {e}")))?;
        // one canonical form so "/api" and "/api/" route the same
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| StoreError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            caller_token,
        })
    }

    /// Route under the base URL; every segment is percent-encoded, so ids
    /// containing `/`, `?` or `#` stay inside their segment.
    fn url(&self, segments: &[&str]) -> StoreResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                StoreError::Validation(format!("store URL {} cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, req: RequestBuilder, what: &str) -> StoreResult<String> {
        let req = match &self.caller_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        };
        let response = req.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(%status, bytes = body.len(), what, "Store responded");

        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(what.to_string()));
        }
        if !status.is_success() {
            warn!(%status, what, "Store returned an error");
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> StoreResult<T> {
        let url = self.url(segments)?;
        let body = self.send(self.client.get(url), &segments.join("/")).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// GET where a 404 means "nothing there yet" rather than a failure
    async fn get_optional<T: DeserializeOwned>(
        &self,
        segments: &[&str],
    ) -> StoreResult<Option<T>> {
        match self.get_json(segments).await {
            Ok(value) => Ok(value),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn post_empty<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> StoreResult<()> {
        let url = self.url(segments)?;
        self.send(self.client.post(url).json(body), &segments.join("/")).await?;
        Ok(())
    }

    async fn put_empty<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> StoreResult<()> {
        let url = self.url(segments)?;
        self.send(self.client.put(url).json(body), &segments.join("/")).await?;
        Ok(())
    }
}

#[async_trait]
impl MarketplaceStore for HttpStore {
    async fn get_all_listings(&self) -> StoreResult<Vec<Listing>> {
        self.get_json(&["listings"]).await
    }

    async fn get_available_listings(&self) -> StoreResult<Vec<Listing>> {
        self.get_json(&["listings", "available"]).await
    }

    async fn get_listing(&self, id: &str) -> StoreResult<Listing> {
        self.get_json(&["listings", id]).await
    }

    async fn get_my_listings(&self) -> StoreResult<Vec<Listing>> {
        self.get_json(&["listings", "mine"]).await
    }

    async fn create_listing(&self, fields: &ListingFields) -> StoreResult<String> {
        let url = self.url(&["listings"])?;
        let body = self.send(self.client.post(url).json(fields), "listings").await?;
        let created: CreatedListing = serde_json::from_str(&body)?;
        Ok(created.id)
    }

    async fn update_listing(
        &self,
        id: &str,
        fields: &ListingFields,
        available: bool,
    ) -> StoreResult<()> {
        self.put_empty(&["listings", id], &UpdateListingBody { fields, available })
            .await
    }

    async fn delete_listing(&self, id: &str) -> StoreResult<()> {
        let url = self.url(&["listings", id])?;
        self.send(self.client.delete(url), &format!("listings/{id}")).await?;
        Ok(())
    }

    async fn search_listings_by_brand(&self, brand: &str) -> StoreResult<Vec<Listing>> {
        let mut url = self.url(&["listings", "search"])?;
        url.query_pairs_mut().append_pair("brand", brand);
        let body = self.send(self.client.get(url), "listings/search").await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn search_listings_by_price_range(
        &self,
        min: i64,
        max: i64,
    ) -> StoreResult<Vec<Listing>> {
        let mut url = self.url(&["listings", "search"])?;
        url.query_pairs_mut()
            .append_pair("minPrice", &min.to_string())
            .append_pair("maxPrice", &max.to_string());
        let body = self.send(self.client.get(url), "listings/search").await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn get_messages_for_listing(&self, listing_id: &str) -> StoreResult<Vec<Message>> {
        self.get_json(&["listings", listing_id, "messages"]).await
    }

    async fn send_message(
        &self,
        receiver: &PrincipalId,
        content: &str,
        listing_id: &str,
    ) -> StoreResult<()> {
        self.post_empty(
            &["messages"],
            &SendMessageBody {
                receiver,
                content,
                listing_id,
            },
        )
        .await
    }

    async fn get_my_buyer_profile(&self) -> StoreResult<Option<BuyerProfile>> {
        self.get_optional(&["profiles", "buyer", "me"]).await
    }

    async fn is_buyer_profile_complete(&self) -> StoreResult<bool> {
        let flag: Flag = self.get_json(&["profiles", "buyer", "me", "complete"]).await?;
        Ok(flag.value)
    }

    async fn get_all_buyer_profiles(&self) -> StoreResult<Vec<BuyerProfile>> {
        self.get_json(&["profiles", "buyer"]).await
    }

    async fn get_buyer_profile(&self, user: &PrincipalId) -> StoreResult<Option<BuyerProfile>> {
        self.get_optional(&["profiles", "buyer", user.as_str()]).await
    }

    async fn create_buyer_profile(&self, input: &BuyerProfileInput) -> StoreResult<()> {
        self.post_empty(&["profiles", "buyer"], input).await
    }

    async fn complete_buyer_profile(&self) -> StoreResult<()> {
        self.post_empty(
            &["profiles", "buyer", "me", "complete"],
            &serde_json::json!({}),
        )
        .await
    }

    async fn upload_buyer_document(&self, kind: DocumentKind, blob: &BlobRef) -> StoreResult<()> {
        self.put_empty(
            &["profiles", "buyer", "me", "documents", kind.as_str()],
            &DocumentBody { blob },
        )
        .await
    }

    async fn get_caller_user_profile(&self) -> StoreResult<Option<UserProfile>> {
        self.get_optional(&["profiles", "me"]).await
    }

    async fn save_caller_user_profile(&self, profile: &UserProfile) -> StoreResult<()> {
        self.put_empty(&["profiles", "me"], profile).await
    }

    async fn get_caller_user_role(&self) -> StoreResult<UserRole> {
        let role: Role = self.get_json(&["profiles", "me", "role"]).await?;
        Ok(role.role)
    }

    async fn is_founder(&self) -> StoreResult<bool> {
        let flag: Flag = self.get_json(&["founder", "me"]).await?;
        Ok(flag.value)
    }

    async fn get_founder_profile(&self) -> StoreResult<Option<FounderProfile>> {
        self.get_optional(&["founder", "profile"]).await
    }

    async fn update_founder_profile(&self, profile: &FounderProfile) -> StoreResult<()> {
        self.put_empty(&["founder", "profile"], profile).await
    }

    async fn get_website_content(&self) -> StoreResult<WebsiteContent> {
        self.get_json(&["content"]).await
    }

    async fn update_website_content(&self, content: &WebsiteContent) -> StoreResult<()> {
        self.put_empty(&["content"], content).await
    }

    async fn get_analytics_data(&self) -> StoreResult<AnalyticsData> {
        self.get_json(&["analytics"]).await
    }

    async fn add_usage_stat(&self, stat: &UsageStat) -> StoreResult<()> {
        self.post_empty(&["analytics", "usage"], stat).await
    }

    fn store_name(&self) -> &'static str {
        "http"
    }
}
