use serde::{Deserialize, Serialize};

use crate::models::Condition;

/// Typed listing filter. `None` in any field means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    /// Case-insensitive substring over title, brand and model
    pub query: Option<String>,
    /// Inclusive lower price bound
    pub min_price: Option<i64>,
    /// Inclusive upper price bound
    pub max_price: Option<i64>,
    /// Inclusive lower model-year bound
    pub min_year: Option<i32>,
    /// Inclusive upper model-year bound
    pub max_year: Option<i32>,
    /// Exact condition; `None` matches every condition
    pub condition: Option<Condition>,
    /// Case-insensitive substring over brand only
    pub brand: Option<String>,
}

impl FilterCriteria {
    /// Whether any predicate would exclude something.
    pub fn is_active(&self) -> bool {
        text_term(&self.query).is_some()
            || text_term(&self.brand).is_some()
            || self.min_price.is_some()
            || self.max_price.is_some()
            || self.min_year.is_some()
            || self.max_year.is_some()
            || self.condition.is_some()
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn with_price(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    pub fn with_year(mut self, min: Option<i32>, max: Option<i32>) -> Self {
        self.min_year = min;
        self.max_year = max;
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}

/// Search term as given, or `None` when the field is unset or whitespace.
pub(crate) fn text_term(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// Filter inputs exactly as typed into a search form.
///
/// Empty strings mean "unset" and the condition accepts the wildcard `"all"`.
/// Numbers that fail to parse are dropped rather than reported. Fractional
/// bounds are rounded inward: a minimum up and a maximum down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterForm {
    pub query: String,
    pub min_price: String,
    pub max_price: String,
    pub min_year: String,
    pub max_year: String,
    pub condition: String,
    pub brand: String,
}

/// Condition value that disables the condition predicate.
pub const ALL_CONDITIONS: &str = "all";

impl Default for FilterForm {
    fn default() -> Self {
        Self {
            query: String::new(),
            min_price: String::new(),
            max_price: String::new(),
            min_year: String::new(),
            max_year: String::new(),
            condition: ALL_CONDITIONS.to_string(),
            brand: String::new(),
        }
    }
}

impl FilterForm {
    /// Resolve the form into typed criteria.
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            query: non_blank(&self.query),
            min_price: parse_number(&self.min_price).map(|n| n.ceil() as i64),
            max_price: parse_number(&self.max_price).map(|n| n.floor() as i64),
            min_year: parse_number(&self.min_year).map(|n| n.ceil() as i32),
            max_year: parse_number(&self.max_year).map(|n| n.floor() as i32),
            condition: self.condition.parse().ok(),
            brand: non_blank(&self.brand),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    (!value.trim().is_empty()).then(|| value.to_string())
}

// Finite numbers only; `as` saturates out-of-range values.
fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}
