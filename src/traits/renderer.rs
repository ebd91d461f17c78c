use crate::core::ViewerStatus;
use crate::scene::{NodeId, SceneGraph};

/// Draws a scene graph from one of its cameras
pub trait SceneRenderer {
    /// Match the drawable surface to the window, in physical pixels
    fn resize(&mut self, width: u32, height: u32);

    /// Draw one frame. `status` feeds the optional overlay.
    fn render(&mut self, scene: &SceneGraph, camera: NodeId, status: &ViewerStatus) -> anyhow::Result<()>;
}
