use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use gltf_viewer::cli::Cli;
use gltf_viewer::config::ViewerConfig;
use gltf_viewer::core::{Clock, Viewer, ViewerEvent, Viewport, WinitController};
use gltf_viewer::diagnostics::{DiagnosticRecord, DiagnosticSink, LogSink};
use gltf_viewer::loaders::{spawn_load, GltfLoader};
use gltf_viewer::renderer::WgpuRenderer;
use gltf_viewer::traits::SceneRenderer;

const DEFAULT_LOG_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

struct App {
    cli: Cli,
    config: ViewerConfig,
    proxy: EventLoopProxy<ViewerEvent>,
    sink: LogSink,
    window: Option<Arc<Window>>,
    renderer: Option<WgpuRenderer>,
    /// Present once the scene has loaded and has a camera
    viewer: Option<Viewer>,
    input: WinitController,
    clock: Clock,
}

impl App {
    fn new(cli: Cli, config: ViewerConfig, proxy: EventLoopProxy<ViewerEvent>) -> Self {
        Self {
            cli,
            config,
            proxy,
            sink: LogSink,
            window: None,
            renderer: None,
            viewer: None,
            input: WinitController::new(),
            clock: Clock::new(),
        }
    }

    fn start_loading(&self) {
        let proxy = self.proxy.clone();
        info!("Loading scene: {:?}", self.cli.scene);

        let spawned = spawn_load(GltfLoader, self.cli.scene.clone(), move |result| {
            // Fails only when the event loop is already gone
            if proxy.send_event(ViewerEvent::SceneLoaded(result)).is_err() {
                warn!("Scene finished loading after the window closed");
            }
        });
        if let Err(e) = spawned {
            self.sink
                .report(DiagnosticRecord::error(format!("Failed to start scene loader: {}", e)));
        }
    }
}

impl ApplicationHandler<ViewerEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title(self.config.window.title.clone())
                .with_transparent(self.config.renderer.clear_alpha < 1.0)
                .with_inner_size(winit::dpi::LogicalSize::new(
                    self.config.window.width,
                    self.config.window.height,
                )),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let renderer = match pollster::block_on(WgpuRenderer::new(
            window.clone(),
            &self.config.renderer,
            &self.config.lights,
            self.config.show_ui,
        )) {
            Ok(r) => r,
            Err(e) => {
                error!("Failed to initialize renderer: {:#}", e);
                event_loop.exit();
                return;
            }
        };

        self.window = Some(window);
        self.renderer = Some(renderer);
        self.start_loading();
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: ViewerEvent) {
        match event {
            ViewerEvent::SceneLoaded(result) => {
                let Some(window) = &self.window else {
                    return;
                };
                let size = window.inner_size();
                let viewport = Viewport::new(size.width, size.height);

                self.viewer = Viewer::initialize(result, self.config.clone(), viewport, &self.sink);
                if self.viewer.is_some() {
                    self.clock = Clock::new();
                    window.request_redraw();
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Let egui handle the event first
        let consumed = self.renderer.as_mut().is_some_and(|renderer| renderer.handle_event(&event));
        if consumed {
            // Releases and cursor moves still reach the input state, without a click or orbit
            self.input.track_consumed_event(&event);
            return;
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size.width, size.height);
                }
                if let Some(viewer) = &mut self.viewer {
                    viewer.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                let delta = self.clock.tick();

                if let (Some(viewer), Some(renderer)) = (&mut self.viewer, &mut self.renderer) {
                    viewer.handle_input(&self.input);
                    self.input.reset_deltas();

                    if let Err(e) = viewer.frame(renderer, delta) {
                        error!("Render error: {:#}", e);
                    }
                }
            }
            event => {
                if let Some(click) = self.input.process_event(&event) {
                    if let Some(viewer) = &mut self.viewer {
                        viewer.click(click.position);
                    }
                }
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // The render loop only runs once a viewer exists
        if let (Some(window), Some(_)) = (&self.window, &self.viewer) {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER)).init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    let event_loop = EventLoop::<ViewerEvent>::with_user_event().build()?;
    let mut app = App::new(cli, config, event_loop.create_proxy());

    info!("glTF Viewer - drag to orbit, right drag to pan, scroll to zoom, click to select, Escape to quit");
    event_loop.run_app(&mut app)?;

    Ok(())
}
