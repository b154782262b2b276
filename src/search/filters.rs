use crate::models::Property;
use crate::search::types::{SearchFilters, SortBy};
use std::cmp::Ordering;
use tracing::debug;

/// Returns the listings matching every criterion in `filters`, in input order
pub fn filter_properties(properties: &[Property], filters: &SearchFilters) -> Vec<Property> {
    let location = filters
        .location
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_lowercase);

    let matched: Vec<Property> = properties
        .iter()
        .filter(|p| p.is_active)
        .filter(|p| filters.listing_type.map_or(true, |lt| p.listing_type == lt))
        .filter(|p| {
            filters.property_types.is_empty() || filters.property_types.contains(&p.property_type)
        })
        .filter(|p| filters.min_price.map_or(true, |min| p.price >= min))
        .filter(|p| filters.max_price.map_or(true, |max| p.price <= max))
        .filter(|p| filters.min_bedrooms.map_or(true, |min| p.bedrooms >= min))
        .filter(|p| filters.min_bathrooms.map_or(true, |min| p.bathrooms >= min))
        .filter(|p| location.as_deref().map_or(true, |needle| matches_location(p, needle)))
        .filter(|p| filters.features.iter().all(|f| p.has_feature(f)))
        .cloned()
        .collect();

    debug!(
        "Filtered {} properties down to {} ({} active filters)",
        properties.len(),
        matched.len(),
        filters.active_filter_count()
    );

    matched
}

/// `needle` must already be lowercased
fn matches_location(property: &Property, needle: &str) -> bool {
    let address = &property.address;
    [
        address.street.as_str(),
        address.city.as_str(),
        address.state.as_str(),
        address.zip_code.as_str(),
        address.country.as_str(),
        property.title.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

/// Stable in-place sort
pub fn sort_properties(properties: &mut [Property], sort_by: SortBy) {
    let price = |a: &Property, b: &Property| a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal);

    match sort_by {
        SortBy::PriceAsc => properties.sort_by(price),
        SortBy::PriceDesc => properties.sort_by(|a, b| price(b, a)),
        SortBy::DateAsc => properties.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortBy::DateDesc => properties.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortBy::ViewsAsc => properties.sort_by_key(|p| p.views),
        SortBy::ViewsDesc => properties.sort_by(|a, b| b.views.cmp(&a.views)),
    }
}

/// Filter, then sort when the filters carry a sort order
pub fn search_properties(properties: &[Property], filters: &SearchFilters) -> Vec<Property> {
    let mut results = filter_properties(properties, filters);
    if let Some(sort_by) = filters.sort_by {
        sort_properties(&mut results, sort_by);
    }
    results
}

pub fn featured(properties: &[Property]) -> Vec<Property> {
    properties
        .iter()
        .filter(|p| p.is_active && p.is_featured)
        .cloned()
        .collect()
}

/// Same type and listing type, priced within 20% of `target`
pub fn similar_properties(target: &Property, properties: &[Property], limit: usize) -> Vec<Property> {
    let low = target.price * 0.8;
    let high = target.price * 1.2;

    properties
        .iter()
        .filter(|p| p.id != target.id && p.is_active)
        .filter(|p| p.property_type == target.property_type && p.listing_type == target.listing_type)
        .filter(|p| p.price >= low && p.price <= high)
        .take(limit)
        .cloned()
        .collect()
}
