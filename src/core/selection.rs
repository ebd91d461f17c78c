//! Click-to-highlight interaction.
//!
//! Every click first restores whatever is highlighted, then highlights the
//! nearest mesh under the pointer, if any. Clicking the highlighted mesh
//! again therefore deselects it and selects it anew in one step.

use glam::Vec2;
use log::debug;

use super::raycaster::Raycaster;
use super::viewport::Viewport;
use crate::config::HighlightStyle;
use crate::math::Color;
use crate::scene::{Material, NodeId, SceneGraph};

/// The highlighted mesh and the appearance it returns to
#[derive(Debug, Clone, PartialEq)]
pub struct Selected {
    pub node: NodeId,
    pub original_color: Color,
    pub original_material: Material,
}

/// What a click did to the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// This node is now highlighted. A previous selection was restored first.
    Selected(NodeId),
    /// The click missed; this node lost its highlight
    Deselected(NodeId),
    Nothing,
}

#[derive(Debug, Default)]
pub struct Selection {
    current: Option<Selected>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&Selected> {
        self.current.as_ref()
    }

    pub fn node(&self) -> Option<NodeId> {
        self.current.as_ref().map(|s| s.node)
    }

    /// Handle a click at `pointer` (physical pixels, origin top-left) seen
    /// through `camera`.
    pub fn on_click(
        &mut self,
        pointer: Vec2,
        viewport: Viewport,
        scene: &mut SceneGraph,
        camera: NodeId,
        style: &HighlightStyle,
    ) -> ClickOutcome {
        let ndc = viewport.to_ndc(pointer.x, pointer.y);
        let hit = match (scene.camera(camera), scene.world_transform(camera)) {
            (Some(cam), Some(world)) => Raycaster::from_camera(ndc, cam, world)
                .intersect_scene(scene)
                .first()
                .map(|hit| hit.node),
            _ => None,
        };

        let outcome = self.apply(scene, hit, style);
        match outcome {
            ClickOutcome::Selected(id) | ClickOutcome::Deselected(id) => {
                let name = scene.get(id).map(|n| n.display_name()).unwrap_or("<unknown>");
                debug!("Clicked on: {} ({:?})", name, outcome);
            }
            ClickOutcome::Nothing => debug!("Clicked on: nothing"),
        }
        outcome
    }

    /// Restore the current selection, then highlight `hit` when it is a mesh
    pub fn apply(&mut self, scene: &mut SceneGraph, hit: Option<NodeId>, style: &HighlightStyle) -> ClickOutcome {
        let previous = self.clear(scene);

        let Some(node) = hit else {
            return previous.map_or(ClickOutcome::Nothing, ClickOutcome::Deselected);
        };
        let Some(mesh) = scene.mesh_mut(node) else {
            return previous.map_or(ClickOutcome::Nothing, ClickOutcome::Deselected);
        };

        let original_material = mesh.effective_material().clone();
        let highlight = Material {
            color: style.color(),
            transparent: true,
            opacity: style.opacity,
            ..original_material.clone()
        };
        mesh.override_material = Some(highlight);

        self.current = Some(Selected {
            node,
            original_color: original_material.color,
            original_material,
        });
        ClickOutcome::Selected(node)
    }

    /// Put the highlighted mesh back the way it was. Returns the node that
    /// was restored.
    pub fn clear(&mut self, scene: &mut SceneGraph) -> Option<NodeId> {
        let selected = self.current.take()?;

        if let Some(mesh) = scene.mesh_mut(selected.node) {
            mesh.override_material = if mesh.material == selected.original_material {
                None
            } else {
                Some(selected.original_material)
            };
        }
        Some(selected.node)
    }
}
