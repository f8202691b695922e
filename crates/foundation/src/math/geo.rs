use serde::{Deserialize, Serialize};

use super::Vec3;

/// Geographic coordinate in degrees.
///
/// Values coming from a provider are not validated on construction; callers
/// that are about to move the map check [`LatLng::is_finite`] first.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    pub fn to_scene_position(self) -> Vec3 {
        lat_lng_to_unit_sphere(self.lat, self.lng)
    }

    pub fn with_altitude(self, altitude: f64) -> LatLngAltitude {
        LatLngAltitude::new(self.lat, self.lng, altitude)
    }
}

/// Geographic coordinate plus altitude in meters, as the map's camera
/// transformer expects it.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLngAltitude {
    pub lat: f64,
    pub lng: f64,
    pub altitude: f64,
}

impl LatLngAltitude {
    pub const fn new(lat: f64, lng: f64, altitude: f64) -> Self {
        Self { lat, lng, altitude }
    }
}

/// Radius of the placeholder scene sphere.
pub const SCENE_SPHERE_RADIUS: f64 = 1.0;

/// Maps latitude/longitude (degrees) onto the unit sphere used for overlay
/// scene positions.
///
/// `x = cos(lat)·cos(lng)`, `y = sin(lat)`, `z = cos(lat)·sin(lng)`.
/// This is not a geodesic or tile-accurate transform. Existing overlay
/// placements depend on this exact formula.
pub fn lat_lng_to_unit_sphere(lat_deg: f64, lng_deg: f64) -> Vec3 {
    let lat = lat_deg.to_radians();
    let lng = lng_deg.to_radians();
    let r = SCENE_SPHERE_RADIUS;
    Vec3::new(
        r * lat.cos() * lng.cos(),
        r * lat.sin(),
        r * lat.cos() * lng.sin(),
    )
}
