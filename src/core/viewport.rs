use glam::Vec2;

use crate::scene::Camera;

/// Render surface size in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// False while minimized
    pub fn is_drawable(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn aspect(&self) -> Option<f32> {
        self.is_drawable()
            .then(|| self.width as f32 / self.height as f32)
    }

    /// Pixel position (origin top-left, y down) to normalized device
    /// coordinates (origin center, y up)
    pub fn to_ndc(&self, x: f32, y: f32) -> Vec2 {
        let width = self.width.max(1) as f32;
        let height = self.height.max(1) as f32;
        Vec2::new(x / width * 2.0 - 1.0, -(y / height * 2.0) + 1.0)
    }
}

/// Match the camera's aspect ratio to a `width` x `height` surface and
/// rebuild its projection. Returns false and leaves the camera alone when the
/// surface has no height.
pub fn sync_aspect(camera: &mut Camera, width: u32, height: u32) -> bool {
    let Some(aspect) = Viewport::new(width, height).aspect() else {
        return false;
    };
    camera.set_aspect(aspect);
    camera.update_projection_matrix();
    true
}
