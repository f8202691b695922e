use foundation::math::{LatLng, Vec3};

use crate::SceneGraph;
use crate::components::{Geometry, Light, Material, Mesh, Rgb, Transform, WHITE};
use crate::entity::NodeId;

pub const AMBIENT_INTENSITY: f64 = 0.75;
pub const DIRECTIONAL_INTENSITY: f64 = 0.25;
pub const DIRECTIONAL_POSITION: Vec3 = Vec3::new(0.5, -1.0, 0.5);

pub const FLOOR_PLAN_SIZE: f64 = 10.0;

pub const HIGHLIGHT_WIDTH: f64 = 5.0;
pub const HIGHLIGHT_HEIGHT: f64 = 3.0;
pub const HIGHLIGHT_COLOR: Rgb = 0xff0000;

/// Ambient fill plus one dim directional light from below.
pub fn add_campus_lights(graph: &mut SceneGraph) {
    graph.add_light(Light::ambient(WHITE, AMBIENT_INTENSITY));
    graph.add_light(Light::directional(
        WHITE,
        DIRECTIONAL_INTENSITY,
        DIRECTIONAL_POSITION,
    ));
}

/// Textured square placed at `at` on the scene sphere.
pub fn floor_plan(at: LatLng, texture_url: impl Into<String>) -> Mesh {
    Mesh::new(
        Geometry::Plane {
            width: FLOOR_PLAN_SIZE,
            height: FLOOR_PLAN_SIZE,
        },
        Material::Textured {
            texture_url: texture_url.into(),
        },
        Transform::translate(at.to_scene_position()),
    )
}

/// Landmark pin model, flipped upright and scaled to be visible at campus zoom.
pub fn landmark(model_url: impl Into<String>, scale: f64) -> Mesh {
    let transform = Transform::identity()
        .with_rotation(Vec3::new(std::f64::consts::PI, 0.0, 0.0))
        .with_uniform_scale(scale);
    Mesh::model(model_url, transform)
}

/// Flat red rectangle marking a search result.
pub fn search_highlight(at: LatLng) -> Mesh {
    Mesh::new(
        Geometry::Box {
            width: HIGHLIGHT_WIDTH,
            height: HIGHLIGHT_HEIGHT,
            depth: 0.0,
        },
        Material::Basic {
            color: HIGHLIGHT_COLOR,
        },
        Transform::translate(at.to_scene_position()),
    )
}

pub fn add_search_highlight(graph: &mut SceneGraph, at: LatLng) -> NodeId {
    graph.add_mesh(search_highlight(at))
}
