use glam::Vec2;
use log::{debug, info};

use super::camera_registry::CameraRegistry;
use super::clock::FpsCounter;
use super::controller::Controller;
use super::orbit_controls::OrbitControls;
use super::selection::{ClickOutcome, Selection};
use super::viewport::{sync_aspect, Viewport};
use crate::config::ViewerConfig;
use crate::diagnostics::{DiagnosticRecord, DiagnosticSink};
use crate::error::{LoadError, ViewerError};
use crate::scene::{NodeId, SceneGraph, SceneStats};
use crate::traits::SceneRenderer;

/// Events posted to the window event loop from other threads
#[derive(Debug)]
pub enum ViewerEvent {
    SceneLoaded(Result<SceneGraph, LoadError>),
}

/// Values shown by the overlay
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewerStatus {
    pub fps: f32,
    pub camera_count: usize,
    pub active_camera_name: String,
    pub selection_name: Option<String>,
    pub stats: SceneStats,
}

/// Interaction state for one loaded scene. Event handlers and the frame
/// handler all go through this.
pub struct Viewer {
    scene: SceneGraph,
    cameras: CameraRegistry,
    controls: OrbitControls,
    selection: Selection,
    viewport: Viewport,
    config: ViewerConfig,
    fps: FpsCounter,
}

impl Viewer {
    /// Pick the active camera, fit it to the viewport and place it at the
    /// configured orbit pose
    pub fn new(mut scene: SceneGraph, config: ViewerConfig, viewport: Viewport) -> Result<Self, ViewerError> {
        let cameras = CameraRegistry::from_scene(&scene)?;
        let active = cameras.active();

        if let Some(camera) = scene.camera_mut(active) {
            sync_aspect(camera, viewport.width, viewport.height);
        }

        let controls = OrbitControls::from_pose(
            config.camera.position(),
            config.camera.target(),
            config.orbit.clone(),
        );
        scene.set_world_transform(active, controls.view_transform());

        info!(
            "Viewing through camera {} of {} ({})",
            active.index(),
            cameras.len(),
            scene.get(active).map(|n| n.display_name()).unwrap_or_default()
        );

        Ok(Self {
            scene,
            cameras,
            controls,
            selection: Selection::new(),
            viewport,
            config,
            fps: FpsCounter::new(),
        })
    }

    /// Turn a finished load into a viewer. Any failure is reported to `sink`
    /// as a single record and yields `None`.
    pub fn initialize(
        loaded: Result<SceneGraph, LoadError>,
        config: ViewerConfig,
        viewport: Viewport,
        sink: &dyn DiagnosticSink,
    ) -> Option<Self> {
        let result = loaded
            .map_err(ViewerError::from)
            .and_then(|scene| Self::new(scene, config, viewport));

        match result {
            Ok(viewer) => Some(viewer),
            Err(e) => {
                sink.report(DiagnosticRecord::error(e.to_string()));
                None
            }
        }
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn cameras(&self) -> &CameraRegistry {
        &self.cameras
    }

    pub fn active_camera(&self) -> NodeId {
        self.cameras.active()
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Handle a click at a physical pixel position
    pub fn click(&mut self, pointer: Vec2) -> ClickOutcome {
        let camera = self.cameras.active();
        self.selection
            .on_click(pointer, self.viewport, &mut self.scene, camera, &self.config.highlight)
    }

    /// Follow a surface resize. A zero-sized surface is ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        let viewport = Viewport::new(width, height);
        if !viewport.is_drawable() {
            debug!("Ignoring resize to {}x{}", width, height);
            return;
        }
        self.viewport = viewport;

        let active = self.cameras.active();
        if let Some(camera) = self.scene.camera_mut(active) {
            sync_aspect(camera, width, height);
        }
    }

    /// Feed accumulated pointer input to the orbit controls
    pub fn handle_input(&mut self, input: &dyn Controller) {
        let active = self.cameras.active();
        if let Some(camera) = self.scene.camera(active) {
            self.controls.handle_input(input, self.viewport, camera);
        }
    }

    /// One render-loop cycle: advance the orbit controls, write the camera
    /// pose, draw
    pub fn frame(&mut self, renderer: &mut dyn SceneRenderer, delta: f32) -> anyhow::Result<()> {
        self.fps.record(delta);

        let active = self.cameras.active();
        if self.controls.update(delta) {
            self.scene.set_world_transform(active, self.controls.view_transform());
        }

        if !self.viewport.is_drawable() {
            return Ok(());
        }
        let status = self.status();
        renderer.render(&self.scene, active, &status)
    }

    pub fn status(&self) -> ViewerStatus {
        let active = self.cameras.active();
        ViewerStatus {
            fps: self.fps.fps(),
            camera_count: self.cameras.len(),
            active_camera_name: self
                .scene
                .get(active)
                .map(|n| n.display_name().to_string())
                .unwrap_or_default(),
            selection_name: self
                .selection
                .node()
                .and_then(|id| self.scene.get(id))
                .map(|n| n.display_name().to_string()),
            stats: self.scene.stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use crate::scene::{Camera, NodeKind};
    use glam::{Mat4, Vec3};

    #[derive(Default)]
    struct CountingRenderer {
        frames: usize,
        last_camera: Option<NodeId>,
    }

    impl SceneRenderer for CountingRenderer {
        fn resize(&mut self, _width: u32, _height: u32) {}

        fn render(&mut self, _scene: &SceneGraph, camera: NodeId, _status: &ViewerStatus) -> anyhow::Result<()> {
            self.frames += 1;
            self.last_camera = Some(camera);
            Ok(())
        }
    }

    fn one_camera_scene() -> (SceneGraph, NodeId) {
        let mut scene = SceneGraph::new();
        let id = scene.add_node(None, Some("Main".into()), Mat4::IDENTITY, NodeKind::Camera(Camera::default()));
        (scene, id)
    }

    #[test]
    fn test_new_places_camera_at_configured_pose() {
        let (scene, id) = one_camera_scene();
        let viewer = Viewer::new(scene, ViewerConfig::default(), Viewport::new(800, 600)).unwrap();

        let eye = viewer.scene().world_transform(id).unwrap().transform_point3(Vec3::ZERO);
        assert!((eye - Vec3::new(0.0, 5.0, 10.0)).length() < 1e-4);

        let aspect = viewer.scene().camera(id).unwrap().aspect();
        assert!((aspect - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn test_resize_resyncs_aspect() {
        let (scene, id) = one_camera_scene();
        let mut viewer = Viewer::new(scene, ViewerConfig::default(), Viewport::new(800, 600)).unwrap();

        viewer.resize(1920, 1080);
        assert!((viewer.scene().camera(id).unwrap().aspect() - 1920.0 / 1080.0).abs() < 1e-6);

        viewer.resize(1920, 0);
        assert_eq!(viewer.viewport(), Viewport::new(1920, 1080));
        assert!((viewer.scene().camera(id).unwrap().aspect() - 1920.0 / 1080.0).abs() < 1e-6);
    }

    #[test]
    fn test_frame_draws_from_active_camera() {
        let (scene, id) = one_camera_scene();
        let mut viewer = Viewer::new(scene, ViewerConfig::default(), Viewport::new(800, 600)).unwrap();
        let mut renderer = CountingRenderer::default();

        viewer.frame(&mut renderer, 1.0 / 60.0).unwrap();
        viewer.frame(&mut renderer, 1.0 / 60.0).unwrap();

        assert_eq!(renderer.frames, 2);
        assert_eq!(renderer.last_camera, Some(id));
    }

    #[test]
    fn test_initialize_reports_missing_cameras_once() {
        let sink = MemorySink::new();
        let viewer = Viewer::initialize(Ok(SceneGraph::new()), ViewerConfig::default(), Viewport::new(800, 600), &sink);

        assert!(viewer.is_none());
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert!(records[0].message.contains("no cameras"));
    }

    #[test]
    fn test_status_names_active_camera() {
        let (scene, _) = one_camera_scene();
        let viewer = Viewer::new(scene, ViewerConfig::default(), Viewport::new(800, 600)).unwrap();

        let status = viewer.status();
        assert_eq!(status.camera_count, 1);
        assert_eq!(status.active_camera_name, "Main");
        assert_eq!(status.selection_name, None);
    }
}
