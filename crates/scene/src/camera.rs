use foundation::math::Mat4;

/// Camera whose projection is replaced wholesale every frame.
///
/// The host map computes a combined view-projection for the current
/// viewport, so there is no separate view matrix or field of view to keep.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct PerspectiveCamera {
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    pub fn set_projection(&mut self, projection: Mat4) {
        self.projection = projection;
    }
}
