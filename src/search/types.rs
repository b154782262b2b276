use crate::models::{ListingType, PropertyType};
use serde::{Deserialize, Serialize};

/// Sort order applied after filtering
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    PriceAsc,
    PriceDesc,
    /// Oldest first
    DateAsc,
    /// Newest first
    DateDesc,
    ViewsAsc,
    ViewsDesc,
}

/// Search criteria for narrowing a property list.
///
/// Every field is optional; the default value matches every active listing.
/// Saved searches persist this struct verbatim as their filter snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct SearchFilters {
    /// Sale or rent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_type: Option<ListingType>,
    /// Accepted property types, empty means any
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub property_types: Vec<PropertyType>,
    /// Minimum price, inclusive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    /// Maximum price, inclusive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_bedrooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_bathrooms: Option<u32>,
    /// Free text matched against address parts and title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Features that must all be present
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortBy>,
}

impl SearchFilters {
    pub fn for_listing(listing_type: ListingType) -> Self {
        Self {
            listing_type: Some(listing_type),
            ..Self::default()
        }
    }

    /// Number of narrowing criteria set; sorting does not count
    pub fn active_filter_count(&self) -> usize {
        let location = self
            .location
            .as_deref()
            .map(|l| !l.trim().is_empty())
            .unwrap_or(false);

        [
            self.listing_type.is_some(),
            !self.property_types.is_empty(),
            self.min_price.is_some(),
            self.max_price.is_some(),
            self.min_bedrooms.is_some(),
            self.min_bathrooms.is_some(),
            location,
            !self.features.is_empty(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.active_filter_count() == 0
    }
}
