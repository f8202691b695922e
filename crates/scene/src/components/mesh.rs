use super::{Rgb, Transform};

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Plane { width: f64, height: f64 },
    Box { width: f64, height: f64, depth: f64 },
    /// glTF asset loaded by the backend; geometry and materials come from the file.
    Model { url: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Basic { color: Rgb },
    Textured { texture_url: String },
    /// Whatever the model file carries.
    Embedded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub geometry: Geometry,
    pub material: Material,
    pub transform: Transform,
}

impl Mesh {
    pub fn new(geometry: Geometry, material: Material, transform: Transform) -> Self {
        Self {
            geometry,
            material,
            transform,
        }
    }

    pub fn model(url: impl Into<String>, transform: Transform) -> Self {
        Self::new(
            Geometry::Model { url: url.into() },
            Material::Embedded,
            transform,
        )
    }

    pub fn is_model(&self) -> bool {
        matches!(self.geometry, Geometry::Model { .. })
    }
}
