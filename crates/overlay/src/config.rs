use foundation::math::LatLng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorPlanConfig {
    pub position: LatLng,
    pub texture_url: String,
}

impl Default for FloorPlanConfig {
    fn default() -> Self {
        Self {
            position: LatLng::new(24.9873, 121.5754),
            texture_url: "floor_plan.jpg".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkConfig {
    pub model_url: String,
    pub scale: f64,
}

impl Default for LandmarkConfig {
    fn default() -> Self {
        Self {
            model_url: "pin.gltf".to_string(),
            scale: 25.0,
        }
    }
}

/// Static content and camera anchoring for the WebGL overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub floor_plan: Option<FloorPlanConfig>,
    pub landmark: Option<LandmarkConfig>,
    /// Altitude (meters) handed to the map's transformer each frame.
    pub draw_altitude: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            floor_plan: Some(FloorPlanConfig::default()),
            landmark: Some(LandmarkConfig::default()),
            draw_altitude: 100.0,
        }
    }
}
