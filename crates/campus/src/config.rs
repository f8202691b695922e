use foundation::math::LatLng;
use overlay::OverlayConfig;
use serde::{Deserialize, Serialize};

use crate::buildings::{BuildingDescriptor, default_buildings};
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    pub center: LatLng,
    pub zoom: f64,
    pub tilt: f64,
    pub heading: f64,
    pub map_id: String,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            center: LatLng::new(24.9877, 121.5756),
            zoom: 18.0,
            tilt: 0.0,
            heading: 0.0,
            map_id: "ca4f444e44fa22da".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Country autocomplete predictions are restricted to.
    pub country: String,
    /// Zoom applied when the map jumps to a search result.
    pub result_zoom: f64,
    /// Radius of the one nearby lookup made for an unresolved marker.
    pub nearby_radius_m: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            country: "tw".to_string(),
            result_zoom: 18.0,
            nearby_radius_m: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampusConfig {
    /// Endpoint returning `{"apiKey": ...}`.
    pub key_endpoint: String,
    pub map: MapOptions,
    pub search: SearchConfig,
    pub model_viewer_page: String,
    /// Shown in info panels for places without a photo.
    pub placeholder_photo_url: String,
    pub buildings: Vec<BuildingDescriptor>,
    pub overlay: OverlayConfig,
}

impl Default for CampusConfig {
    fn default() -> Self {
        Self {
            key_endpoint: "/api/key".to_string(),
            map: MapOptions::default(),
            search: SearchConfig::default(),
            model_viewer_page: "glb-model.html".to_string(),
            placeholder_photo_url: "images/placeholder.png".to_string(),
            buildings: default_buildings(),
            overlay: OverlayConfig::default(),
        }
    }
}

impl CampusConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: CampusConfig =
            serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.map.center.is_finite() {
            return Err(ConfigError::Invalid("map center is not finite".to_string()));
        }
        for building in &self.buildings {
            if building.code.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "building '{}' has an empty code",
                    building.title
                )));
            }
            if !building.position.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "building '{}' has a non-finite position",
                    building.code
                )));
            }
        }
        Ok(())
    }
}
