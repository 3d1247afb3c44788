use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Listing;

/// Reference to a file held by the external blob storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobRef(pub String);

/// Identity documents a buyer can attach to their profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentKind {
    ProfilePhoto,
    Aadhaar,
    Pan,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::ProfilePhoto => "profile-photo",
            DocumentKind::Aadhaar => "aadhaar",
            DocumentKind::Pan => "pan",
        }
    }
}

/// Buyer registration details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerProfileInput {
    pub full_name: String,
    pub phone_number: String,
    pub email: String,
    pub address: String,
    pub aadhaar_number: String,
    pub pan_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerProfile {
    pub full_name: String,
    pub phone_number: String,
    pub email: String,
    pub address: String,
    pub aadhaar_number: String,
    pub pan_number: String,
    pub profile_photo: Option<BlobRef>,
    pub aadhaar_document: Option<BlobRef>,
    pub pan_document: Option<BlobRef>,
    pub is_profile_complete: bool,
    pub created_at: DateTime<Utc>,
}

impl BuyerProfile {
    pub fn new(input: BuyerProfileInput, created_at: DateTime<Utc>) -> Self {
        Self {
            full_name: input.full_name,
            phone_number: input.phone_number,
            email: input.email,
            address: input.address,
            aadhaar_number: input.aadhaar_number,
            pan_number: input.pan_number,
            profile_photo: None,
            aadhaar_document: None,
            pan_document: None,
            is_profile_complete: false,
            created_at,
        }
    }

    /// Slot for the given document kind.
    pub fn document_mut(&mut self, kind: DocumentKind) -> &mut Option<BlobRef> {
        match kind {
            DocumentKind::ProfilePhoto => &mut self.profile_photo,
            DocumentKind::Aadhaar => &mut self.aadhaar_document,
            DocumentKind::Pan => &mut self.pan_document,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub contact_info: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
    Guest,
}

/// Public profile of the marketplace founder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FounderProfile {
    pub name: String,
    pub address: String,
    pub contact_number: String,
    pub email_address: String,
    pub instagram_profile: String,
}

/// Editable copy shown on the public pages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteContent {
    pub hero_section: String,
    pub about_page: String,
    pub footer_info: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStat {
    pub visitors: u64,
    pub listings: u64,
    pub users: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsData {
    pub active_listings: u64,
    pub total_visitors: u64,
    pub registered_users: u64,
    pub usage_stats: Vec<UsageStat>,
}

/// Headline numbers for the admin dashboard, derived client-side
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_listings: usize,
    pub active_listings: usize,
    pub sold_listings: usize,
    pub total_users: usize,
    pub active_buyers: usize,
    pub recent_activity_count: usize,
}

/// Number of listings surfaced in the recent activity feed.
pub const RECENT_ACTIVITY_LIMIT: usize = 10;

impl DashboardMetrics {
    pub fn compute(listings: &[Listing], buyers: &[BuyerProfile]) -> Self {
        let total_listings = listings.len();
        let active_listings = listings.iter().filter(|l| l.available).count();
        Self {
            total_listings,
            active_listings,
            sold_listings: total_listings - active_listings,
            total_users: buyers.len(),
            active_buyers: buyers.iter().filter(|b| b.is_profile_complete).count(),
            recent_activity_count: total_listings.min(RECENT_ACTIVITY_LIMIT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub kind: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

impl ActivityEntry {
    /// Feed entries for the first listings in store order.
    pub fn recent(listings: &[Listing]) -> Vec<Self> {
        listings
            .iter()
            .take(RECENT_ACTIVITY_LIMIT)
            .map(|listing| {
                let (kind, verb) = if listing.available {
                    ("Listing", "New listing")
                } else {
                    ("Sale", "Sold")
                };
                Self {
                    kind: kind.to_string(),
                    description: format!("{verb}: {}", listing.title),
                    timestamp: listing.listed_at,
                }
            })
            .collect()
    }
}
