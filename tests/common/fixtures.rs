use std::sync::Arc;
use std::time::Duration;

use bike_bazaar::config::CacheSettings;
use bike_bazaar::models::{Condition, ListingFields};
use bike_bazaar::Marketplace;

use super::mocks::InstrumentedStore;

/// Valid listing fields for a bike of the given brand and price
#[allow(dead_code)]
pub fn bike(brand: &str, model: &str, price: i64) -> ListingFields {
    ListingFields {
        title: format!("{brand} {model} for sale"),
        brand: brand.to_string(),
        model: model.to_string(),
        year: 2019,
        price,
        mileage: Some(12_000),
        condition: Condition::Good,
        description: "Serviced regularly".to_string(),
        contact_info: "9800000000".to_string(),
    }
}

/// Cache windows short enough to cross with `tokio::time::advance`
#[allow(dead_code)]
pub fn short_cache() -> CacheSettings {
    CacheSettings {
        stale_time: Duration::from_secs(60),
        live_stale_time: Duration::from_secs(5),
        live_refetch_interval: Duration::from_secs(5),
    }
}

#[allow(dead_code)]
pub fn marketplace(store: &Arc<InstrumentedStore>) -> Marketplace {
    Marketplace::new(store.clone(), short_cache())
}
