//! Window management and the frame loop using winit

use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowId},
};

use crate::core::config::AppConfig;
use crate::core::error::Error;
use crate::core::input::InputState;
use crate::core::time::FrameTimer;
use crate::core::types::Result;
use crate::render::context::GpuContext;
use crate::render::renderer::VoxelRenderer;

/// GPU state that only exists once a window does
struct Graphics {
    window: Arc<Window>,
    gpu: GpuContext,
    renderer: VoxelRenderer,
}

/// Application handler that owns the window and drives frames
struct App {
    config: AppConfig,
    graphics: Option<Graphics>,
    input: InputState,
    timer: FrameTimer,
    /// First fatal error, reported after the loop exits
    error: Option<Error>,
}

impl App {
    fn new(config: AppConfig) -> Self {
        Self {
            config,
            graphics: None,
            input: InputState::new(),
            timer: FrameTimer::new(),
            error: None,
        }
    }

    fn init_graphics(&self, event_loop: &ActiveEventLoop) -> Result<Graphics> {
        // Hidden until everything below succeeded
        let window_attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.window.width, self.config.window.height))
            .with_visible(false);

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .map_err(|e| Error::Window(e.to_string()))?,
        );

        let gpu = pollster::block_on(GpuContext::new(window.clone()))?;
        let renderer = VoxelRenderer::new(&gpu, &self.config)?;

        let size = window.inner_size();
        log::info!("Window created: {}x{}", size.width, size.height);
        window.set_visible(true);

        Ok(Graphics {
            window,
            gpu,
            renderer,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: Error) {
        log::error!("{}", error);
        if self.error.is_none() {
            self.error = Some(error);
        }
        event_loop.exit();
    }

    fn set_cursor_grab(&mut self, grabbed: bool) {
        if let Some(graphics) = &self.graphics {
            let window = &graphics.window;
            if grabbed {
                window.set_cursor_grab(CursorGrabMode::Confined)
                    .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked))
                    .ok();
                window.set_cursor_visible(false);
            } else {
                window.set_cursor_grab(CursorGrabMode::None).ok();
                window.set_cursor_visible(true);
            }
        }
        self.input.set_mouse_captured(grabbed);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(graphics) = &mut self.graphics else {
            return;
        };

        self.timer.tick();
        let dt = self.timer.delta_secs();

        match graphics.renderer.update(&graphics.gpu, &self.input, dt) {
            Ok(true) => {}
            Ok(false) => {
                event_loop.exit();
                return;
            }
            Err(e) => {
                self.fail(event_loop, e);
                return;
            }
        }

        self.input.end_frame();

        if self.timer.frame_count() % 60 == 0 {
            graphics.window.set_title(&format!(
                "{} - {:.1} FPS | Tab=mouse, WASD=move",
                self.config.window.title,
                self.timer.fps()
            ));
        }

        self.timer.throttle(self.config.target_fps);
        graphics.window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.graphics.is_some() || self.error.is_some() {
            return;
        }

        match self.init_graphics(event_loop) {
            Ok(graphics) => {
                graphics.window.request_redraw();
                self.graphics = Some(graphics);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.process_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if size.width > 0 && size.height > 0 {
                    if let Some(graphics) = &mut self.graphics {
                        graphics.gpu.resize(size.width, size.height);
                        graphics.renderer.resize(size.width, size.height);
                    }
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed() && !event.repeat {
                    match event.physical_key {
                        PhysicalKey::Code(KeyCode::Escape) => {
                            if self.input.is_mouse_captured() {
                                self.set_cursor_grab(false);
                            } else {
                                self.input.request_exit();
                            }
                        }
                        PhysicalKey::Code(KeyCode::Tab) => {
                            let grabbed = self.input.is_mouse_captured();
                            self.set_cursor_grab(!grabbed);
                        }
                        _ => {}
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if state == ElementState::Pressed
                    && button == MouseButton::Left
                    && !self.input.is_mouse_captured()
                {
                    self.set_cursor_grab(true);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.input.process_mouse_motion(delta);
        }
    }
}

/// Open the window and run frames until the user quits or a frame fails
pub fn run(config: AppConfig) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|e| Error::Window(e.to_string()))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop
        .run_app(&mut app)
        .map_err(|e| Error::Window(e.to_string()))?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
