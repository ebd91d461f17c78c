//! Viewer configuration, loadable from JSON. Every field has a default.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ViewerError;
use crate::math::Color;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "glTF Viewer".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// 4x MSAA when enabled
    pub antialias: bool,
    /// sRGB hex
    pub clear_color: u32,
    pub clear_alpha: f32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            antialias: true,
            clear_color: 0xffffff,
            clear_alpha: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub color: u32,
    pub intensity: f32,
    /// Only used by directional lights; the light shines from here toward the origin
    pub position: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightsConfig {
    pub ambient: LightConfig,
    pub directional: LightConfig,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            color: 0xffffff,
            intensity: 1.0,
            position: [0.0, 0.0, 0.0],
        }
    }
}

impl Default for LightsConfig {
    fn default() -> Self {
        Self {
            ambient: LightConfig {
                intensity: 0.5,
                ..LightConfig::default()
            },
            directional: LightConfig {
                intensity: 1.0,
                position: [5.0, 10.0, 7.5],
                ..LightConfig::default()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 5.0, 10.0],
            target: [0.0, 0.0, 0.0],
        }
    }
}

impl CameraConfig {
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn target(&self) -> Vec3 {
        Vec3::from_array(self.target)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    /// Full turns per viewport height of drag
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    /// `None` applies input immediately
    pub damping_factor: Option<f32>,
    pub min_distance: f32,
    /// `None` leaves dolly-out unbounded
    pub max_distance: Option<f32>,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            damping_factor: None,
            min_distance: 0.0,
            max_distance: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightStyle {
    /// sRGB hex
    pub color: u32,
    pub opacity: f32,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            color: 0xffff00,
            opacity: 0.5,
        }
    }
}

impl HighlightStyle {
    pub fn color(&self) -> Color {
        Color::from_hex(self.color)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub renderer: RendererConfig,
    pub lights: LightsConfig,
    pub camera: CameraConfig,
    pub orbit: OrbitConfig,
    pub highlight: HighlightStyle,
    /// Draw the egui overlay
    pub show_ui: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            renderer: RendererConfig::default(),
            lights: LightsConfig::default(),
            camera: CameraConfig::default(),
            orbit: OrbitConfig::default(),
            highlight: HighlightStyle::default(),
            show_ui: true,
        }
    }
}

impl ViewerConfig {
    pub fn from_json(text: &str) -> Result<Self, ViewerError> {
        serde_json::from_str(text).map_err(|e| ViewerError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ViewerError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ViewerError::Config(format!("cannot read {:?}: {}", path, e)))?;
        Self::from_json(&text)
    }
}
