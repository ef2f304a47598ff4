//! Winit Frame Loop
//!
//! [`App`] configures the window and renderer; [`App::run`] hands control to
//! winit until the window closes. All mutable state (renderer, scene,
//! controls, timing) lives in the internal `AppRunner`, which is the
//! `ApplicationHandler` and passes that state explicitly to every handler.
//!
//! # Example
//!
//! ```rust,ignore
//! use shadow_lab::{App, RenderSettings, ShadowAlgorithm};
//!
//! App::new()
//!     .with_title("Shadow Lab")
//!     .with_algorithm(ShadowAlgorithm::Psvsm)
//!     .run()?;
//! ```

use std::sync::Arc;
use std::time::Instant;

use glam::Vec2;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use super::controls::{Command, Controls};
use crate::errors::{Result, ShadowLabError};
use crate::renderer::Renderer;
use crate::renderer::settings::RenderSettings;
use crate::scene::Scene;
use crate::shadow::ShadowAlgorithm;
use crate::utils::{FpsCounter, FpsReport};

/// Application builder.
pub struct App {
    title: String,
    settings: RenderSettings,
    algorithm: ShadowAlgorithm,
}

impl App {
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: "Shadow Lab".into(),
            settings: RenderSettings::default(),
            algorithm: ShadowAlgorithm::default(),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: RenderSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Algorithm active on the first frame.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: ShadowAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Runs the event loop until the window closes.
    ///
    /// Returns the startup error if the window or GPU context could not be
    /// created.
    pub fn run(self) -> Result<()> {
        self.settings.validate()?;

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut runner = AppRunner::new(self);
        event_loop.run_app(&mut runner)?;

        runner.startup_error.map_or(Ok(()), Err)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

struct AppRunner {
    title: String,
    settings: RenderSettings,
    algorithm: ShadowAlgorithm,

    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    scene: Scene,
    controls: Controls,
    fps: FpsCounter,

    startup_error: Option<ShadowLabError>,
}

impl AppRunner {
    fn new(app: App) -> Self {
        let scene = Scene::comparison_scene(&app.settings);
        Self {
            title: app.title,
            settings: app.settings,
            algorithm: app.algorithm,
            window: None,
            renderer: None,
            scene,
            controls: Controls::new(),
            fps: FpsCounter::new(),
            startup_error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title(&self.title)
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.settings.frame_width,
                self.settings.frame_height,
            ));
        let window = Arc::new(event_loop.create_window(window_attributes)?);

        log::info!("Initializing Renderer Backend...");
        let mut renderer = pollster::block_on(Renderer::new(
            window.clone(),
            self.settings.clone(),
            &self.scene,
            self.algorithm,
        ))?;

        let size = window.inner_size();
        renderer.resize(size.width, size.height);
        if size.height > 0 {
            self.scene.camera.set_aspect(size.width as f32 / size.height as f32);
        }

        self.window = Some(window);
        self.renderer = Some(renderer);
        Ok(())
    }

    fn apply(&mut self, command: Command, event_loop: &ActiveEventLoop) {
        let Some(renderer) = &mut self.renderer else {
            return;
        };

        match command {
            Command::SelectAlgorithm(algorithm) => {
                renderer.select_algorithm(algorithm);
            }
            Command::CascadeUp => {
                let count = renderer.set_cascade_count(renderer.cascade_count() + 1);
                log::info!("Cascades: {count}");
            }
            Command::CascadeDown => {
                let fewer = renderer.cascade_count().saturating_sub(1);
                let count = renderer.set_cascade_count(fewer);
                log::info!("Cascades: {count}");
            }
            Command::ToggleLight => {
                let on = self.scene.lights.toggle_switch();
                self.scene.update_light_camera();
                log::info!("Light {}", if on { "on" } else { "off" });
            }
            Command::LogCameraPosition => {
                let p = self.scene.camera.position();
                log::info!("Camera position: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z);
            }
            Command::TogglePause => {
                let paused = self.controls.is_paused();
                event_loop.set_control_flow(self.controls.control_flow());
                if !paused && let Some(window) = &self.window {
                    window.request_redraw();
                }
                log::info!("{}", if paused { "Paused" } else { "Resumed" });
            }
            Command::Quit => event_loop.exit(),
        }
    }

    fn render_frame(&mut self) {
        if self.controls.is_paused() {
            return;
        }
        let (Some(window), Some(renderer)) = (&self.window, &mut self.renderer) else {
            return;
        };

        self.scene.update_light_camera();
        let start = Instant::now();
        renderer.render(&self.scene);
        let work = start.elapsed();

        if let Some(report) = self.fps.update(work) {
            let FpsReport { fps, work_fps } = report;
            let algorithm = renderer.algorithm();
            let name = algorithm.short_name();
            window.set_title(&format!("{} | {name} | {work_fps:.1} FPS", self.title));
            log::info!("{algorithm}: {work_fps:.1} FPS (presented {fps:.1})");
        }
    }
}

impl ApplicationHandler for AppRunner {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            log::error!("Fatal Renderer Error: {e}");
            self.startup_error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size.width, size.height);
                }
                if size.height > 0 {
                    self.scene.camera.set_aspect(size.width as f32 / size.height as f32);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                if let PhysicalKey::Code(code) = event.physical_key
                    && let Some(command) = self.controls.on_key(code)
                {
                    self.apply(command, event_loop);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.controls.on_mouse_button(button, state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let position = Vec2::new(position.x as f32, position.y as f32);
                self.controls.on_cursor_moved(position, &mut self.scene.camera);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32,
                };
                self.controls.on_scroll(delta_y, &mut self.scene.camera);
            }
            WindowEvent::RedrawRequested => {
                self.render_frame();
                if !self.controls.is_paused()
                    && let Some(window) = &self.window
                {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if self.renderer.is_some()
            && !self.controls.is_paused()
            && let Some(window) = &self.window
        {
            window.request_redraw();
        }
    }
}
