//! Cache key definitions.
//!
//! A [`QueryKey`] names one remote read together with its parameters. Keys
//! are grouped into [`KeyFamily`]s so a mutation can drop every read that
//! might have observed the changed data without enumerating parameters.

use std::fmt;

use crate::models::{
    ActivityEntry, AnalyticsData, BuyerProfile, DashboardMetrics, FounderProfile, Listing,
    Message, UserProfile, UserRole, WebsiteContent,
};

/// Address of a cached read
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    // Listing collections
    Listings,
    AvailableListings,
    ListingsByBrand(String),
    ListingsByPriceRange { min: i64, max: i64 },
    MyListings,

    // Single listing
    Listing(String),

    // Threads
    Messages(String),

    // Profiles
    MyBuyerProfile,
    BuyerProfileComplete,
    BuyerProfiles,
    CallerProfile,
    CallerRole,

    // Back office
    IsFounder,
    FounderProfile,
    WebsiteContent,
    AnalyticsData,
    DashboardMetrics,
    RecentActivity,
}

/// Coarse grouping of keys for invalidation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyFamily {
    /// Every collection-of-listings read (all, available, searches)
    Listings,
    /// Single listing reads for any id
    Listing,
    /// Message threads for any listing
    Messages,
    /// Buyer and caller profile reads
    Profiles,
    /// Founder, content and analytics reads
    BackOffice,
}

impl QueryKey {
    pub fn family(&self) -> KeyFamily {
        match self {
            QueryKey::Listings
            | QueryKey::AvailableListings
            | QueryKey::ListingsByBrand(_)
            | QueryKey::ListingsByPriceRange { .. }
            | QueryKey::MyListings => KeyFamily::Listings,
            QueryKey::Listing(_) => KeyFamily::Listing,
            QueryKey::Messages(_) => KeyFamily::Messages,
            QueryKey::MyBuyerProfile
            | QueryKey::BuyerProfileComplete
            | QueryKey::BuyerProfiles
            | QueryKey::CallerProfile
            | QueryKey::CallerRole => KeyFamily::Profiles,
            QueryKey::IsFounder
            | QueryKey::FounderProfile
            | QueryKey::WebsiteContent
            | QueryKey::AnalyticsData
            | QueryKey::DashboardMetrics
            | QueryKey::RecentActivity => KeyFamily::BackOffice,
        }
    }

    /// Keys whose data should be close to real time
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            QueryKey::Messages(_)
                | QueryKey::AnalyticsData
                | QueryKey::DashboardMetrics
                | QueryKey::RecentActivity
        )
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::Listings => f.write_str("listings"),
            QueryKey::AvailableListings => f.write_str("listings/available"),
            QueryKey::ListingsByBrand(brand) => write!(f, "listings/brand/{brand}"),
            QueryKey::ListingsByPriceRange { min, max } => write!(f, "listings/price/{min}-{max}"),
            QueryKey::MyListings => f.write_str("myListings"),
            QueryKey::Listing(id) => write!(f, "listing/{id}"),
            QueryKey::Messages(listing_id) => write!(f, "messages/{listing_id}"),
            QueryKey::MyBuyerProfile => f.write_str("myBuyerProfile"),
            QueryKey::BuyerProfileComplete => f.write_str("isBuyerProfileComplete"),
            QueryKey::BuyerProfiles => f.write_str("buyerProfiles"),
            QueryKey::CallerProfile => f.write_str("callerProfile"),
            QueryKey::CallerRole => f.write_str("callerUserRole"),
            QueryKey::IsFounder => f.write_str("isFounder"),
            QueryKey::FounderProfile => f.write_str("founderProfile"),
            QueryKey::WebsiteContent => f.write_str("websiteContent"),
            QueryKey::AnalyticsData => f.write_str("analyticsData"),
            QueryKey::DashboardMetrics => f.write_str("adminMetrics"),
            QueryKey::RecentActivity => f.write_str("recentActivity"),
        }
    }
}

/// What a mutation asks the cache to forget
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Invalidate {
    Key(QueryKey),
    Family(KeyFamily),
}

impl Invalidate {
    pub fn matches(&self, key: &QueryKey) -> bool {
        match self {
            Invalidate::Key(target) => target == key,
            Invalidate::Family(family) => key.family() == *family,
        }
    }
}

impl From<QueryKey> for Invalidate {
    fn from(key: QueryKey) -> Self {
        Invalidate::Key(key)
    }
}

impl From<KeyFamily> for Invalidate {
    fn from(family: KeyFamily) -> Self {
        Invalidate::Family(family)
    }
}

/// Cached payload of any read
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Listings(Vec<Listing>),
    Listing(Listing),
    Messages(Vec<Message>),
    BuyerProfile(Option<BuyerProfile>),
    BuyerProfiles(Vec<BuyerProfile>),
    Flag(bool),
    UserProfile(Option<UserProfile>),
    Role(UserRole),
    FounderProfile(Option<FounderProfile>),
    WebsiteContent(WebsiteContent),
    Analytics(AnalyticsData),
    Metrics(DashboardMetrics),
    Activity(Vec<ActivityEntry>),
}

/// Types that can live in the query cache
pub trait Cached: Clone + Send + Sync + 'static {
    fn into_value(self) -> QueryValue;
    fn from_value(value: &QueryValue) -> Option<Self>;
}

macro_rules! cached {
    ($ty:ty => $variant:ident) => {
        impl Cached for $ty {
            fn into_value(self) -> QueryValue {
                QueryValue::$variant(self)
            }

            fn from_value(value: &QueryValue) -> Option<Self> {
                match value {
                    QueryValue::$variant(inner) => Some(inner.clone()),
                    _ => None,
                }
            }
        }
    };
}

cached!(Vec<Listing> => Listings);
cached!(Listing => Listing);
cached!(Vec<Message> => Messages);
cached!(Option<BuyerProfile> => BuyerProfile);
cached!(Vec<BuyerProfile> => BuyerProfiles);
cached!(bool => Flag);
cached!(Option<UserProfile> => UserProfile);
cached!(UserRole => Role);
cached!(Option<FounderProfile> => FounderProfile);
cached!(WebsiteContent => WebsiteContent);
cached!(AnalyticsData => Analytics);
cached!(DashboardMetrics => Metrics);
cached!(Vec<ActivityEntry> => Activity);
