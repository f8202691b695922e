pub mod camera;
pub mod components;
pub mod entity;
pub mod graph;
pub mod prefabs;

pub use camera::*;
pub use graph::*;
