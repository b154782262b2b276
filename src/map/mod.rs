//! Map geometry over listing coordinates.
//!
//! Everything here is a linear scan; listing volumes are in the tens to low
//! hundreds so no spatial index is kept.

pub mod tiles;

use crate::models::{Coordinates, Property};
use serde::{Deserialize, Serialize};

pub use tiles::MapConfig;

/// Mean earth radius in kilometres
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Zoom used when every listing sits on (nearly) the same point
pub const DETAIL_ZOOM: u8 = 13;

/// Span thresholds in degrees, checked in order, mapped to a zoom level
const ZOOM_TABLE: [(f64, u8); 8] = [
    (10.0, 5),
    (5.0, 6),
    (2.0, 7),
    (1.0, 8),
    (0.5, 9),
    (0.25, 10),
    (0.1, 11),
    (0.05, 12),
];

/// Great-circle distance in kilometres
pub fn haversine_distance(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Axis-aligned lat/lng rectangle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Bounds {
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// Inclusive of every edge
    pub fn contains(&self, point: Coordinates) -> bool {
        point.lat <= self.north
            && point.lat >= self.south
            && point.lng <= self.east
            && point.lng >= self.west
    }

    pub fn center(&self) -> Coordinates {
        Coordinates::new((self.north + self.south) / 2.0, (self.east + self.west) / 2.0)
    }

    pub fn lat_span(&self) -> f64 {
        self.north - self.south
    }

    pub fn lng_span(&self) -> f64 {
        self.east - self.west
    }

    /// Smallest bounds holding every point, `None` for an empty input
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coordinates>,
    {
        points.into_iter().fold(None, |acc: Option<Bounds>, p| {
            Some(match acc {
                None => Bounds::new(p.lat, p.lat, p.lng, p.lng),
                Some(b) => Bounds::new(
                    b.north.max(p.lat),
                    b.south.min(p.lat),
                    b.east.max(p.lng),
                    b.west.min(p.lng),
                ),
            })
        })
    }
}

/// Centre, zoom and bounds for showing a set of listings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MapView {
    pub center: Coordinates,
    pub zoom: u8,
    pub bounds: Bounds,
}

/// Zoom level for a span given in degrees
pub fn zoom_for_span(span: f64) -> u8 {
    ZOOM_TABLE
        .iter()
        .find(|(threshold, _)| span > *threshold)
        .map(|(_, zoom)| *zoom)
        .unwrap_or(DETAIL_ZOOM)
}

pub fn fit_bounds(properties: &[Property]) -> Option<MapView> {
    let bounds = Bounds::enclosing(properties.iter().filter_map(|p| p.coordinates))?;
    let span = bounds.lat_span().max(bounds.lng_span());

    Some(MapView {
        center: bounds.center(),
        zoom: zoom_for_span(span),
        bounds,
    })
}

/// Listings whose coordinates fall inside `bounds`; listings without
/// coordinates are skipped
pub fn properties_in_bounds<'a>(properties: &'a [Property], bounds: &Bounds) -> Vec<&'a Property> {
    properties
        .iter()
        .filter(|p| p.coordinates.map_or(false, |c| bounds.contains(c)))
        .collect()
}

/// Listings within `radius_km` of `center`, nearest first
pub fn properties_within_radius<'a>(
    properties: &'a [Property],
    center: Coordinates,
    radius_km: f64,
) -> Vec<(&'a Property, f64)> {
    let mut hits: Vec<(&Property, f64)> = properties
        .iter()
        .filter_map(|p| p.coordinates.map(|c| (p, haversine_distance(center, c))))
        .filter(|(_, distance)| *distance <= radius_km)
        .collect();

    hits.sort_by(|a, b| a.1.total_cmp(&b.1));
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sample_properties;

    const AUSTIN: Coordinates = Coordinates {
        lat: 30.2672,
        lng: -97.7431,
    };
    const MIAMI: Coordinates = Coordinates {
        lat: 25.7617,
        lng: -80.1918,
    };

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(haversine_distance(AUSTIN, AUSTIN), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let there = haversine_distance(AUSTIN, MIAMI);
        let back = haversine_distance(MIAMI, AUSTIN);
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn distance_matches_known_value() {
        // Austin to Miami is roughly 1790 km
        let d = haversine_distance(AUSTIN, MIAMI);
        assert!((1750.0..1830.0).contains(&d), "got {}", d);
    }

    #[test]
    fn contains_is_inclusive_of_edges() {
        let bounds = Bounds::new(31.0, 30.0, -97.0, -98.0);
        assert!(bounds.contains(Coordinates::new(31.0, -97.5)));
        assert!(bounds.contains(Coordinates::new(30.0, -97.5)));
        assert!(bounds.contains(Coordinates::new(30.5, -97.0)));
        assert!(bounds.contains(Coordinates::new(30.5, -98.0)));
        assert!(bounds.contains(Coordinates::new(31.0, -98.0)));
        assert!(!bounds.contains(Coordinates::new(31.0001, -97.5)));
        assert!(!bounds.contains(Coordinates::new(30.5, -96.9999)));
    }

    #[test]
    fn bounds_filter_skips_missing_coordinates() {
        let properties = sample_properties();
        let everywhere = Bounds::new(90.0, -90.0, 180.0, -180.0);
        let inside = properties_in_bounds(&properties, &everywhere);
        let with_coords = properties.iter().filter(|p| p.coordinates.is_some()).count();
        assert_eq!(inside.len(), with_coords);
        assert!(with_coords < properties.len());

        let texas = Bounds::new(31.0, 30.0, -97.0, -98.0);
        let austin = properties_in_bounds(&properties, &texas);
        assert!(!austin.is_empty());
        assert!(austin.iter().all(|p| p.address.city == "Austin"));
    }

    #[test]
    fn radius_search_orders_nearest_first() {
        let properties = sample_properties();
        let hits = properties_within_radius(&properties, AUSTIN, 50.0);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0.id, "prop-1");
        assert!(hits.windows(2).all(|w| w[0].1 <= w[1].1));
    }

    #[test]
    fn zoom_table_thresholds() {
        assert_eq!(zoom_for_span(40.0), 5);
        assert_eq!(zoom_for_span(10.0), 6);
        assert_eq!(zoom_for_span(3.0), 7);
        assert_eq!(zoom_for_span(1.5), 8);
        assert_eq!(zoom_for_span(0.6), 9);
        assert_eq!(zoom_for_span(0.3), 10);
        assert_eq!(zoom_for_span(0.2), 11);
        assert_eq!(zoom_for_span(0.07), 12);
        assert_eq!(zoom_for_span(0.01), DETAIL_ZOOM);
        assert_eq!(zoom_for_span(0.0), DETAIL_ZOOM);
    }

    #[test]
    fn fit_bounds_covers_every_listing() {
        let properties = sample_properties();
        let view = fit_bounds(&properties).unwrap();
        for p in &properties {
            if let Some(c) = p.coordinates {
                assert!(view.bounds.contains(c));
            }
        }
        assert_eq!(view.zoom, 5);
        assert_eq!(view.center, view.bounds.center());
    }

    #[test]
    fn fit_bounds_single_point_and_empty() {
        let mut properties = sample_properties();
        properties.truncate(1);
        let view = fit_bounds(&properties).unwrap();
        assert_eq!(view.zoom, DETAIL_ZOOM);
        assert_eq!(view.center, AUSTIN);

        properties[0].coordinates = None;
        assert!(fit_bounds(&properties).is_none());
        assert!(fit_bounds(&[]).is_none());
    }
}
