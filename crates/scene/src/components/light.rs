use foundation::math::Vec3;

/// 0xRRGGBB colour.
pub type Rgb = u32;

pub const WHITE: Rgb = 0xffffff;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Light {
    Ambient {
        color: Rgb,
        intensity: f64,
    },
    Directional {
        color: Rgb,
        intensity: f64,
        position: Vec3,
    },
}

impl Light {
    pub fn ambient(color: Rgb, intensity: f64) -> Self {
        Light::Ambient { color, intensity }
    }

    pub fn directional(color: Rgb, intensity: f64, position: Vec3) -> Self {
        Light::Directional {
            color,
            intensity,
            position,
        }
    }
}
