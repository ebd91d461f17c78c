use crate::error::ViewerError;
use crate::scene::{NodeId, NodeKind, SceneGraph};

/// Every camera node in depth-first, parent-before-children order
pub fn collect_cameras(scene: &SceneGraph) -> Vec<NodeId> {
    scene
        .traverse()
        .filter(|&id| matches!(scene.get(id).map(|n| &n.kind), Some(NodeKind::Camera(_))))
        .collect()
}

/// Cameras found in the loaded scene. The first one is active.
#[derive(Debug, Clone)]
pub struct CameraRegistry {
    cameras: Vec<NodeId>,
}

impl CameraRegistry {
    pub fn from_scene(scene: &SceneGraph) -> Result<Self, ViewerError> {
        let cameras = collect_cameras(scene);
        if cameras.is_empty() {
            return Err(ViewerError::NoCameras);
        }
        Ok(Self { cameras })
    }

    pub fn cameras(&self) -> &[NodeId] {
        &self.cameras
    }

    pub fn active(&self) -> NodeId {
        self.cameras[0]
    }

    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }
}
