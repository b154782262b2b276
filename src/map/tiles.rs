use crate::models::Coordinates;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Raster tile source and initial viewport
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapConfig {
    /// Template with `{s}`, `{z}`, `{x}` and `{y}` placeholders
    pub tile_url: String,
    pub subdomains: Vec<String>,
    pub attribution: String,
    pub default_center: Coordinates,
    pub default_zoom: u8,
    pub min_zoom: u8,
    pub max_zoom: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            subdomains: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            attribution: "© OpenStreetMap contributors".to_string(),
            default_center: Coordinates::new(39.8283, -98.5795),
            default_zoom: 4,
            min_zoom: 2,
            max_zoom: 18,
        }
    }
}

impl MapConfig {
    pub fn clamp_zoom(&self, zoom: u8) -> u8 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    /// Concrete tile URL; subdomains rotate on `x + y`
    pub fn tile_url(&self, z: u8, x: u32, y: u32) -> String {
        let subdomain = if self.subdomains.is_empty() {
            ""
        } else {
            let index = (x as usize + y as usize) % self.subdomains.len();
            self.subdomains[index].as_str()
        };

        self.tile_url
            .replace("{s}", subdomain)
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}

/// Web-mercator tile holding `point` at `zoom`
pub fn tile_for(point: Coordinates, zoom: u8) -> (u32, u32) {
    let n = f64::from(1u32 << zoom.min(30));
    let lat = point.lat.clamp(-85.0511, 85.0511).to_radians();

    let x = ((point.lng + 180.0) / 360.0 * n).floor();
    let y = ((1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * n).floor();

    let max = n - 1.0;
    (x.clamp(0.0, max) as u32, y.clamp(0.0, max) as u32)
}
