use glam::Vec3;

use crate::math::Color;

#[derive(Clone, Debug, PartialEq)]
pub enum LightKind {
    Ambient,
    /// Shines along the node's -Z axis
    Directional,
    Point { range: Option<f32> },
    Spot {
        range: Option<f32>,
        inner_cone_angle: f32,
        outer_cone_angle: f32,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub color: Color,
    pub intensity: f32,
}

impl Light {
    pub fn ambient(color: Color, intensity: f32) -> Self {
        Self {
            kind: LightKind::Ambient,
            color,
            intensity,
        }
    }

    pub fn directional(color: Color, intensity: f32) -> Self {
        Self {
            kind: LightKind::Directional,
            color,
            intensity,
        }
    }

    pub fn point(color: Color, intensity: f32, range: Option<f32>) -> Self {
        Self {
            kind: LightKind::Point { range },
            color,
            intensity,
        }
    }

    pub fn radiance(&self) -> Color {
        self.color.scaled(self.intensity)
    }
}

/// A light resolved to world space, ready for shading
#[derive(Clone, Debug, PartialEq)]
pub struct WorldLight {
    pub light: Light,
    pub position: Vec3,
    /// Direction the light travels, normalized
    pub direction: Vec3,
}
