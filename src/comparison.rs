use crate::models::Property;
use crate::search::{format_area, format_property_price};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Most listings shown side by side
pub const MAX_COMPARE: usize = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComparisonError {
    #[error("Comparison is full ({} properties)", MAX_COMPARE)]
    Full,

    #[error("Property {0} is already being compared")]
    AlreadyAdded(String),
}

/// Listings picked for side-by-side comparison
#[derive(Debug, Clone, Default)]
pub struct ComparisonTray {
    items: Vec<Property>,
}

impl ComparisonTray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, property: Property) -> Result<(), ComparisonError> {
        if self.contains(&property.id) {
            return Err(ComparisonError::AlreadyAdded(property.id));
        }
        if self.is_full() {
            return Err(ComparisonError::Full);
        }
        debug!("Adding {} to comparison", property.id);
        self.items.push(property);
        Ok(())
    }

    /// Returns whether anything was removed
    pub fn remove(&mut self, property_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|p| p.id != property_id);
        before != self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn contains(&self, property_id: &str) -> bool {
        self.items.iter().any(|p| p.id == property_id)
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= MAX_COMPARE
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Property] {
        &self.items
    }

    /// Attribute rows with one cell per compared listing, in tray order
    pub fn comparison_rows(&self) -> Vec<ComparisonRow> {
        let row = |label: &str, cell: &dyn Fn(&Property) -> String| ComparisonRow {
            label: label.to_string(),
            values: self.items.iter().map(cell).collect(),
        };

        vec![
            row("price", &format_property_price),
            row("type", &|p: &Property| p.property_type.to_string()),
            row("listing", &|p: &Property| p.listing_type.to_string()),
            row("bedrooms", &|p: &Property| p.bedrooms.to_string()),
            row("bathrooms", &|p: &Property| p.bathrooms.to_string()),
            row("garage", &|p: &Property| p.garage.to_string()),
            row("area", &|p: &Property| p.area.map(format_area).unwrap_or_else(|| "-".to_string())),
            row("location", &|p: &Property| p.address.city.clone()),
            row("features", &|p: &Property| p.features.join(", ")),
        ]
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ComparisonRow {
    pub label: String,
    pub values: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sample_properties;

    #[test]
    fn holds_at_most_three() {
        let mut tray = ComparisonTray::new();
        let mut properties = sample_properties().into_iter();
        for _ in 0..MAX_COMPARE {
            tray.add(properties.next().unwrap()).unwrap();
        }
        assert!(tray.is_full());
        assert_eq!(tray.add(properties.next().unwrap()), Err(ComparisonError::Full));
        assert_eq!(tray.len(), MAX_COMPARE);
    }

    #[test]
    fn rejects_duplicates() {
        let mut tray = ComparisonTray::new();
        let property = sample_properties().remove(0);
        tray.add(property.clone()).unwrap();
        assert_eq!(
            tray.add(property.clone()),
            Err(ComparisonError::AlreadyAdded(property.id.clone()))
        );
        assert_eq!(tray.len(), 1);
    }

    #[test]
    fn duplicate_check_runs_before_full_check() {
        let mut tray = ComparisonTray::new();
        let properties = sample_properties();
        for p in properties.iter().take(MAX_COMPARE) {
            tray.add(p.clone()).unwrap();
        }
        assert!(matches!(
            tray.add(properties[0].clone()),
            Err(ComparisonError::AlreadyAdded(_))
        ));
    }

    #[test]
    fn remove_and_clear() {
        let mut tray = ComparisonTray::new();
        let properties = sample_properties();
        tray.add(properties[0].clone()).unwrap();
        tray.add(properties[1].clone()).unwrap();

        assert!(tray.remove(&properties[0].id));
        assert!(!tray.remove(&properties[0].id));
        assert!(!tray.contains(&properties[0].id));
        assert!(tray.contains(&properties[1].id));

        tray.clear();
        assert!(tray.is_empty());
    }

    #[test]
    fn rows_have_one_cell_per_item() {
        let mut tray = ComparisonTray::new();
        let properties = sample_properties();
        tray.add(properties[0].clone()).unwrap();
        tray.add(properties[3].clone()).unwrap();

        let rows = tray.comparison_rows();
        assert!(rows.iter().all(|r| r.values.len() == 2));
        let price = rows.iter().find(|r| r.label == "price").unwrap();
        assert_eq!(price.values, vec!["$450,000".to_string(), "$2,200/mo".to_string()]);
    }
}
