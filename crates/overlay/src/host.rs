use foundation::math::LatLngAltitude;
use scene::{PerspectiveCamera, SceneGraph};

/// Per-frame camera transform supplied by the host map.
pub trait Transformer {
    /// Column-major 4x4 matrix placing the scene origin at `at`.
    fn from_lat_lng_altitude(&self, at: LatLngAltitude) -> Vec<f64>;
}

/// The map-side half of the overlay lifecycle.
pub trait OverlayHost {
    fn request_redraw(&self);
}

/// A renderer bound to the graphics context the host handed out.
///
/// The host owns clearing and presenting; a backend only draws into the
/// shared context and must restore whatever GL state it touched when asked.
pub trait RenderBackend {
    fn set_auto_clear(&mut self, enabled: bool);
    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera);
    fn reset_state(&mut self);
}
