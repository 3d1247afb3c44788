use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::store::StoreError;

pub mod profile;

pub use profile::{
    ActivityEntry, AnalyticsData, BlobRef, BuyerProfile, BuyerProfileInput, DashboardMetrics,
    DocumentKind, FounderProfile, UsageStat, UserProfile, UserRole, WebsiteContent,
};

/// Oldest model year a listing may carry.
pub const MIN_YEAR: i32 = 1900;

/// Identity of a marketplace user as issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(pub String);

impl PrincipalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Physical condition of a bike as declared by the seller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Excellent,
    Good,
    Fair,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Excellent => "excellent",
            Condition::Good => "good",
            Condition::Fair => "fair",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Condition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "excellent" => Ok(Condition::Excellent),
            "good" => Ok(Condition::Good),
            "fair" => Ok(Condition::Fair),
            other => Err(format!("unknown condition: {other}")),
        }
    }
}

/// Seller-editable part of a listing.
///
/// Create and update both submit the full set of fields; the store replaces
/// whatever it held before.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingFields {
    pub title: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub price: i64,
    pub mileage: Option<i64>,
    pub condition: Condition,
    pub description: String,
    pub contact_info: String,
}

impl ListingFields {
    /// Check the listing invariants against the current calendar year.
    pub fn validate(&self) -> Result<(), StoreError> {
        self.validate_for_year(Utc::now().year())
    }

    /// Check the listing invariants, accepting model years up to `current_year + 1`.
    pub fn validate_for_year(&self, current_year: i32) -> Result<(), StoreError> {
        let required = [
            ("title", &self.title),
            ("brand", &self.brand),
            ("model", &self.model),
            ("contact info", &self.contact_info),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(StoreError::Validation(format!("{name} is required")));
            }
        }

        if self.price <= 0 {
            return Err(StoreError::Validation(format!(
                "price must be positive, got {}",
                self.price
            )));
        }

        let max_year = current_year + 1;
        if !(MIN_YEAR..=max_year).contains(&self.year) {
            return Err(StoreError::Validation(format!(
                "year must be between {MIN_YEAR} and {max_year}, got {}",
                self.year
            )));
        }

        if matches!(self.mileage, Some(km) if km < 0) {
            return Err(StoreError::Validation("mileage cannot be negative".to_string()));
        }

        Ok(())
    }
}

/// A seller's bike-for-sale record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub title: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub price: i64,
    pub mileage: Option<i64>,
    pub condition: Condition,
    pub description: String,
    pub contact_info: String,
    pub available: bool,
    pub seller: PrincipalId,
    pub listed_at: DateTime<Utc>,
}

impl Listing {
    /// Build a fresh listing from submitted fields.
    pub fn new(
        id: impl Into<String>,
        seller: PrincipalId,
        fields: ListingFields,
        listed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: fields.title,
            brand: fields.brand,
            model: fields.model,
            year: fields.year,
            price: fields.price,
            mileage: fields.mileage,
            condition: fields.condition,
            description: fields.description,
            contact_info: fields.contact_info,
            available: true,
            seller,
            listed_at,
        }
    }

    /// The seller-editable fields, copied as-is.
    pub fn fields(&self) -> ListingFields {
        ListingFields {
            title: self.title.clone(),
            brand: self.brand.clone(),
            model: self.model.clone(),
            year: self.year,
            price: self.price,
            mileage: self.mileage,
            condition: self.condition,
            description: self.description.clone(),
            contact_info: self.contact_info.clone(),
        }
    }

    /// Replace every seller-editable field and the availability flag.
    /// Identity, seller and creation time are left alone.
    pub fn apply(&mut self, fields: ListingFields, available: bool) {
        self.title = fields.title;
        self.brand = fields.brand;
        self.model = fields.model;
        self.year = fields.year;
        self.price = fields.price;
        self.mileage = fields.mileage;
        self.condition = fields.condition;
        self.description = fields.description;
        self.contact_info = fields.contact_info;
        self.available = available;
    }
}

/// A message in the thread attached to a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub listing_id: String,
    pub sender: PrincipalId,
    pub receiver: PrincipalId,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}
