//! Window, event loop and renderer glue around the GPU-free [`Viewer`]
//!
//! [`ShowroomApp`] is a winit [`ApplicationHandler`]. It creates the window
//! (on the web: attached to the page canvas), brings up the
//! [`RenderEngine`] and routes pointer, keyboard and resize events into the
//! viewer. External control arrives as [`ViewerCommand`] user events through
//! an [`EventLoopProxy`].

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy},
    window::{Window, WindowId},
};

use crate::{
    config::ViewerConfig,
    error::{ViewerError, ViewerResult},
    gfx::rendering::{FrameStatus, RenderEngine},
    ui::{UiAction, ERROR_MESSAGE},
    viewer::Viewer,
};

#[cfg(not(target_arch = "wasm32"))]
use crate::ui::{panel, UiManager};
#[cfg(target_arch = "wasm32")]
use crate::ui::dom::{self, DomUi};

/// Longest step fed to the viewer; longer gaps (tab switch, debugger) are cut
const MAX_FRAME_DT: f64 = 0.1;

/// Pixels per wheel line for touchpads reporting pixel deltas
const PIXELS_PER_LINE: f64 = 100.0;

static INSTANCE_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Process-wide token; only one viewer can hold it at a time
#[derive(Debug)]
pub struct InstanceGuard(());

impl InstanceGuard {
    pub fn acquire() -> ViewerResult<Self> {
        if INSTANCE_ACTIVE.swap(true, Ordering::SeqCst) {
            return Err(ViewerError::AlreadyRunning);
        }
        Ok(Self(()))
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        INSTANCE_ACTIVE.store(false, Ordering::SeqCst);
    }
}

/// Messages delivered to the running app through its event loop proxy
pub enum ViewerCommand {
    Pause,
    Resume,
    ResetCamera,
    ToggleRotation,
    Teardown,
    Ui(UiAction),
    /// Renderer finished its async setup
    #[cfg(target_arch = "wasm32")]
    RendererReady(Result<Box<RenderEngine>, ViewerError>),
}

/// Wall clock in seconds
#[derive(Debug, Default)]
struct FrameClock {
    #[cfg(not(target_arch = "wasm32"))]
    origin: Option<std::time::Instant>,
    last: Option<f64>,
}

impl FrameClock {
    #[cfg(not(target_arch = "wasm32"))]
    fn now(&mut self) -> f64 {
        self.origin
            .get_or_insert_with(std::time::Instant::now)
            .elapsed()
            .as_secs_f64()
    }

    #[cfg(target_arch = "wasm32")]
    fn now(&mut self) -> f64 {
        web_sys::window()
            .and_then(|window| window.performance())
            .map(|performance| performance.now() / 1000.0)
            .unwrap_or(0.0)
    }

    /// Seconds since the previous tick, zero right after a reset
    fn tick(&mut self) -> f64 {
        let now = self.now();
        let dt = self.last.map_or(0.0, |last| (now - last).clamp(0.0, MAX_FRAME_DT));
        self.last = Some(now);
        dt
    }

    fn reset(&mut self) {
        self.last = None;
    }
}

pub struct ShowroomApp {
    viewer: Viewer,
    proxy: EventLoopProxy<ViewerCommand>,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    #[cfg(not(target_arch = "wasm32"))]
    ui_manager: Option<UiManager>,
    #[cfg(target_arch = "wasm32")]
    dom: Option<DomUi>,
    clock: FrameClock,
    cursor: Option<PhysicalPosition<f64>>,
    startup_error: Option<ViewerError>,
    exiting: bool,
    instance: Option<InstanceGuard>,
}

impl ShowroomApp {
    pub fn new(config: ViewerConfig, proxy: EventLoopProxy<ViewerCommand>, instance: InstanceGuard) -> Self {
        Self {
            viewer: Viewer::new(config),
            proxy,
            window: None,
            render_engine: None,
            #[cfg(not(target_arch = "wasm32"))]
            ui_manager: None,
            #[cfg(target_arch = "wasm32")]
            dom: None,
            clock: FrameClock::default(),
            cursor: None,
            startup_error: None,
            exiting: false,
            instance: Some(instance),
        }
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    /// Handle for sending [`ViewerCommand`]s from outside the event loop
    pub fn proxy(&self) -> EventLoopProxy<ViewerCommand> {
        self.proxy.clone()
    }

    /// Stops advancing and requesting frames
    pub fn pause(&mut self) {
        self.viewer.pause();
    }

    /// Restarts the frame loop without a time jump
    pub fn resume(&mut self) {
        if self.exiting {
            return;
        }
        self.viewer.resume();
        self.clock.reset();
        self.request_redraw();
    }

    pub fn reset_camera(&mut self) {
        self.viewer.reset_camera();
        self.request_redraw();
    }

    pub fn toggle_rotation(&mut self) -> bool {
        let enabled = self.viewer.toggle_rotation();
        self.request_redraw();
        enabled
    }

    /// Cancels the loop and resume timer and detaches page listeners
    pub fn teardown(&mut self) {
        self.viewer.teardown();
        #[cfg(target_arch = "wasm32")]
        if let Some(mut dom) = self.dom.take() {
            dom.detach();
        }
        self.exiting = true;
        self.instance = None;
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: ViewerError) {
        log::error!("{} {}", ERROR_MESSAGE, err);
        #[cfg(target_arch = "wasm32")]
        dom::show_error_overlay();
        self.startup_error = Some(err);
        self.teardown();
        event_loop.exit();
    }

    fn apply_command(&mut self, command: ViewerCommand) {
        match command {
            ViewerCommand::Pause => self.pause(),
            ViewerCommand::Resume => self.resume(),
            ViewerCommand::ResetCamera => self.reset_camera(),
            ViewerCommand::ToggleRotation => {
                self.toggle_rotation();
            }
            ViewerCommand::Teardown => self.teardown(),
            ViewerCommand::Ui(action) => {
                self.viewer.handle_ui_action(action);
                self.request_redraw();
            }
            #[cfg(target_arch = "wasm32")]
            ViewerCommand::RendererReady(_) => {}
        }
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> ViewerResult<Arc<Window>> {
        let attributes = Window::default_attributes().with_title("Showroom");

        #[cfg(not(target_arch = "wasm32"))]
        let attributes = {
            let (width, height) = self.viewer.config().window_size;
            attributes.with_inner_size(winit::dpi::LogicalSize::new(width, height))
        };

        // The page owns the canvas size
        #[cfg(target_arch = "wasm32")]
        let attributes = {
            use winit::platform::web::WindowAttributesExtWebSys;
            let document = dom::document()?;
            let canvas = dom::canvas(&document, &self.viewer.config().canvas_id)?;
            attributes.with_canvas(Some(canvas))
        };

        Ok(Arc::new(event_loop.create_window(attributes)?))
    }

    /// Current surface size, falling back to the configured size while the
    /// canvas has not been laid out yet
    fn surface_size(&self, window: &Window) -> (u32, u32) {
        let PhysicalSize { width, height } = window.inner_size();
        if width == 0 || height == 0 {
            self.viewer.config().window_size
        } else {
            (width, height)
        }
    }

    fn on_renderer_ready(&mut self, render_engine: RenderEngine) {
        let Some(window) = self.window.clone() else {
            return;
        };
        let (width, height) = render_engine.get_surface_size();
        self.viewer.resize(width, height);

        #[cfg(not(target_arch = "wasm32"))]
        {
            let mut ui_manager = UiManager::new(
                render_engine.device(),
                render_engine.queue(),
                render_engine.surface_format(),
                &window,
            );
            ui_manager.update_display_size(width, height);
            self.ui_manager = Some(ui_manager);
        }

        #[cfg(target_arch = "wasm32")]
        if let Some(dom) = &mut self.dom {
            dom.hide_loading();
            dom.sync(&self.viewer.status());
        }

        self.render_engine = Some(render_engine);
        self.clock.reset();
        log::info!("Viewer started ({}x{})", width, height);
        window.request_redraw();
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.viewer.resize(width, height);
        if let Some(render_engine) = &mut self.render_engine {
            render_engine.resize(width, height);
        }
        #[cfg(not(target_arch = "wasm32"))]
        if let Some(ui_manager) = &mut self.ui_manager {
            ui_manager.update_display_size(width, height);
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key: winit::keyboard::KeyCode) {
        use winit::keyboard::KeyCode;

        match key {
            KeyCode::Space => {
                let enabled = self.toggle_rotation();
                log::debug!("Auto-rotation {}", if enabled { "on" } else { "off" });
            }
            KeyCode::KeyR => self.reset_camera(),
            KeyCode::KeyP => {
                if self.viewer.is_paused() {
                    self.resume();
                } else {
                    self.pause();
                }
            }
            KeyCode::Escape => {
                self.teardown();
                event_loop.exit();
            }
            _ => {}
        }
    }

    fn redraw(&mut self) {
        let dt = self.clock.tick();
        self.viewer.frame(dt);

        let (Some(window), Some(render_engine)) = (self.window.as_ref(), self.render_engine.as_mut())
        else {
            return;
        };

        #[cfg(not(target_arch = "wasm32"))]
        let frame = {
            let status = self.viewer.status();
            let mut actions = Vec::new();
            let frame = match self.ui_manager.as_mut() {
                Some(ui_manager) => render_engine.render_frame(
                    self.viewer.scene(),
                    self.viewer.lighting(),
                    Some(|device: &wgpu::Device,
                          queue: &wgpu::Queue,
                          encoder: &mut wgpu::CommandEncoder,
                          view: &wgpu::TextureView| {
                        ui_manager.draw(device, queue, encoder, window, view, |ui| {
                            panel::viewer_panel(ui, &status, &mut actions);
                        });
                    }),
                ),
                None => render_engine.render_frame_simple(self.viewer.scene(), self.viewer.lighting()),
            };
            for action in actions {
                self.viewer.handle_ui_action(action);
            }
            frame
        };

        #[cfg(target_arch = "wasm32")]
        let frame = {
            let frame = render_engine.render_frame_simple(self.viewer.scene(), self.viewer.lighting());
            if let Some(dom) = &mut self.dom {
                dom.sync(&self.viewer.status());
            }
            frame
        };

        let keep_running = !self.viewer.is_paused() && !self.exiting;
        if keep_running || frame == FrameStatus::Reconfigured {
            window.request_redraw();
        }
    }

    fn on_pointer_event(&mut self, event: &WindowEvent) {
        match *event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Some(position);
                self.viewer
                    .pointer_move(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let Some(position) = self.cursor else {
                    return;
                };
                let (x, y) = (position.x as f32, position.y as f32);
                match state {
                    ElementState::Pressed => self.viewer.pointer_down(x, y),
                    ElementState::Released => self.viewer.pointer_up(x, y),
                }
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.viewer.pointer_leave();
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(position) => (position.y / PIXELS_PER_LINE) as f32,
                };
                self.viewer.wheel(lines);
            }
            _ => {}
        }
    }
}

impl ApplicationHandler<ViewerCommand> for ShowroomApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.exiting {
            return;
        }

        let window = match self.create_window(event_loop) {
            Ok(window) => window,
            Err(err) => {
                self.fail(event_loop, err);
                return;
            }
        };
        self.window = Some(window.clone());
        let (width, height) = self.surface_size(&window);

        #[cfg(not(target_arch = "wasm32"))]
        match pollster::block_on(RenderEngine::new(window.clone(), width, height)) {
            Ok(render_engine) => self.on_renderer_ready(render_engine),
            Err(err) => self.fail(event_loop, err),
        }

        #[cfg(target_arch = "wasm32")]
        {
            match dom::document() {
                Ok(document) => {
                    let proxy = self.proxy.clone();
                    self.dom = Some(DomUi::bind(&document, move |action| {
                        if proxy.send_event(ViewerCommand::Ui(action)).is_err() {
                            log::debug!("Event loop closed, dropping {:?}", action);
                        }
                    }));
                }
                Err(err) => {
                    self.fail(event_loop, err);
                    return;
                }
            }

            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let result = RenderEngine::new(window, width, height)
                    .await
                    .map(Box::new);
                if proxy
                    .send_event(ViewerCommand::RendererReady(result))
                    .is_err()
                {
                    log::warn!("Renderer ready after the event loop closed");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, command: ViewerCommand) {
        #[cfg(target_arch = "wasm32")]
        if let ViewerCommand::RendererReady(result) = command {
            if self.exiting {
                return;
            }
            match result {
                Ok(render_engine) => self.on_renderer_ready(*render_engine),
                Err(err) => self.fail(event_loop, err),
            }
            return;
        }

        self.apply_command(command);
        if self.exiting {
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };

        #[cfg(not(target_arch = "wasm32"))]
        let ui_captured = self
            .ui_manager
            .as_mut()
            .is_some_and(|ui_manager| ui_manager.handle_input(&window, window_id, &event));
        #[cfg(target_arch = "wasm32")]
        let ui_captured = {
            let _ = window_id;
            false
        };

        match event {
            WindowEvent::CloseRequested => {
                self.teardown();
                event_loop.exit();
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => self.resize(width, height),
            WindowEvent::RedrawRequested => {
                if !self.exiting {
                    self.redraw();
                }
                return;
            }
            #[cfg(not(target_arch = "wasm32"))]
            WindowEvent::KeyboardInput {
                event:
                    winit::event::KeyEvent {
                        physical_key: winit::keyboard::PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } if !ui_captured => self.handle_key(event_loop, key_code),
            WindowEvent::CursorMoved { .. }
            | WindowEvent::MouseInput { .. }
            | WindowEvent::CursorLeft { .. }
            | WindowEvent::MouseWheel { .. } => {
                if !ui_captured {
                    self.on_pointer_event(&event);
                }
            }
            _ => {}
        }

        // One frame so UI and hover changes show while paused
        if self.viewer.is_paused() && !self.exiting {
            window.request_redraw();
        }
    }
}

/// Runs the viewer in a native window until it is closed
#[cfg(not(target_arch = "wasm32"))]
pub fn run(config: ViewerConfig) -> ViewerResult<()> {
    let instance = InstanceGuard::acquire()?;
    let event_loop = EventLoop::<ViewerCommand>::with_user_event().build()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = ShowroomApp::new(config, event_loop.create_proxy(), instance);
    event_loop.run_app(&mut app)?;

    match app.startup_error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Starts the viewer on the page and returns a handle for commands
#[cfg(target_arch = "wasm32")]
pub fn spawn(config: ViewerConfig) -> ViewerResult<EventLoopProxy<ViewerCommand>> {
    use winit::platform::web::EventLoopExtWebSys;

    let instance = InstanceGuard::acquire()?;
    let event_loop = EventLoop::<ViewerCommand>::with_user_event().build()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let proxy = event_loop.create_proxy();
    event_loop.spawn_app(ShowroomApp::new(config, proxy.clone(), instance));
    Ok(proxy)
}
