//! Winit platform: main window, event pump and Dear ImGui input
//!
//! The event loop is driven with `pump_app_events` so `Application::run` keeps
//! ownership of the frame loop. Desktop targets only.

use std::time::Duration;

use dear_application::imgui::Context;
use dear_application::{BackendResult, NativeWindow, PixelDensity, Platform, Renderer, WindowSize};
use dear_imgui_winit as imgui_winit;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use tracing::{debug, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::error::OsError;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::WinitWgpuConfig;
use crate::error::WinitWgpuError;

// Pumps to wait for `resumed` while opening the main window.
const OPEN_WINDOW_PUMPS: usize = 64;

// Dear ImGui asserts on a zero frame delta.
const MIN_DELTA_TIME: f32 = 1.0e-6;

/// Winit-backed `Platform`
pub struct WinitPlatform {
    default_size: (u32, u32),
    resizable: bool,
    event_loop: Option<EventLoop<()>>,
    state: WindowState,
}

#[derive(Default)]
struct WindowState {
    window: Option<Window>,
    imgui: Option<imgui_winit::WinitPlatform>,
    occluded: bool,
    close_requested: bool,
    quit_requested: bool,
    exited: bool,
    ime_allowed: bool,
    density: PixelDensity,
}

impl WindowState {
    fn keep_running(&self) -> bool {
        self.window.is_some() && !self.exited && !self.close_requested && !self.quit_requested
    }
}

impl WinitPlatform {
    pub fn new(config: &WinitWgpuConfig) -> Self {
        Self {
            default_size: config.default_window_size,
            resizable: config.resizable,
            event_loop: None,
            state: WindowState::default(),
        }
    }

    /// The main window, while open
    pub fn window(&self) -> Option<&Window> {
        self.state.window.as_ref()
    }

    fn event_loop(&mut self) -> Result<&mut EventLoop<()>, WinitWgpuError> {
        if self.event_loop.is_none() {
            let event_loop = EventLoop::new()?;
            event_loop.set_control_flow(ControlFlow::Poll);
            self.event_loop = Some(event_loop);
        }
        self.event_loop.as_mut().ok_or(WinitWgpuError::NotResumed)
    }

    fn create_window(&mut self, title: &str, size: WindowSize) -> Result<Window, WinitWgpuError> {
        let (width, height) = size.resolve(self.default_size);
        let attributes = Window::default_attributes()
            .with_title(title)
            .with_inner_size(LogicalSize::new(width as f64, height as f64))
            .with_resizable(self.resizable)
            .with_visible(false);

        let event_loop = self.event_loop()?;
        let mut opener = WindowOpener {
            attributes: Some(attributes),
            window: None,
        };
        for _ in 0..OPEN_WINDOW_PUMPS {
            let status = event_loop.pump_app_events(Some(Duration::ZERO), &mut opener);
            if opener.window.is_some() || matches!(status, PumpStatus::Exit(_)) {
                break;
            }
        }
        match opener.window {
            Some(window) => Ok(window?),
            None => Err(WinitWgpuError::NotResumed),
        }
    }
}

impl Platform for WinitPlatform {
    fn application_start(&mut self, args: &[String]) -> BackendResult<()> {
        debug!("Starting winit platform with {} argument(s)", args.len());
        self.event_loop()?;
        Ok(())
    }

    fn application_stop(&mut self) {
        self.state.imgui = None;
        if self.state.window.take().is_some() {
            info!("Main window destroyed");
        }
    }

    fn open_main_window(
        &mut self,
        title: &str,
        size: WindowSize,
        ctx: &mut Context,
    ) -> BackendResult<()> {
        let window = self.create_window(title, size)?;

        let mut imgui = imgui_winit::WinitPlatform::new(ctx);
        imgui.attach_window(&window, imgui_winit::HiDpiMode::Default, ctx);

        // The initial scale is not a change.
        self.state.density.set(window.scale_factor() as f32);
        self.state.density.acknowledge();

        let inner = window.inner_size();
        info!(
            "Main window '{title}' opened ({}x{} px, scale {:.2})",
            inner.width,
            inner.height,
            window.scale_factor()
        );
        self.state.window = Some(window);
        self.state.imgui = Some(imgui);
        Ok(())
    }

    fn close_main_window(&mut self) -> bool {
        // The window itself lives until `application_stop`; the renderer's
        // surface still refers to it.
        match &self.state.window {
            Some(window) if !self.state.close_requested => {
                window.set_visible(false);
                self.state.close_requested = true;
                true
            }
            _ => false,
        }
    }

    fn main_window_handle(&self) -> Option<NativeWindow> {
        let window = self.state.window.as_ref()?;
        let raw_window = window.window_handle().ok()?.as_raw();
        let raw_display = window.display_handle().ok()?.as_raw();
        // SAFETY: the window is only dropped in `application_stop`, which the
        // application calls after the renderer has been destroyed.
        Some(unsafe { NativeWindow::from_raw(raw_window, raw_display) })
    }

    fn framebuffer_size(&self) -> Option<(u32, u32)> {
        self.state.window.as_ref().map(|window| {
            let size = window.inner_size();
            (size.width, size.height)
        })
    }

    fn set_main_window_title(&mut self, title: &str) {
        if let Some(window) = &self.state.window {
            window.set_title(title);
        }
    }

    fn show_main_window(&mut self) {
        if let Some(window) = &self.state.window {
            window.set_visible(true);
            window.focus_window();
        }
    }

    fn process_events(&mut self, ctx: &mut Context, renderer: &mut dyn Renderer) -> bool {
        if !self.state.keep_running() {
            return false;
        }
        let Some(event_loop) = self.event_loop.as_mut() else {
            return false;
        };

        let mut pump = EventPump {
            state: &mut self.state,
            ctx,
            renderer,
        };
        if let PumpStatus::Exit(code) = event_loop.pump_app_events(Some(Duration::ZERO), &mut pump)
        {
            debug!("Event loop exited with code {code}");
            self.state.exited = true;
        }

        self.state.keep_running()
    }

    fn is_main_window_visible(&self) -> bool {
        let Some(window) = &self.state.window else {
            return false;
        };
        let size = window.inner_size();
        !self.state.occluded
            && window.is_visible() != Some(false)
            && window.is_minimized() != Some(true)
            && size.width > 0
            && size.height > 0
    }

    fn begin_frame(&mut self, ctx: &mut Context) {
        if let (Some(window), Some(imgui)) = (&self.state.window, self.state.imgui.as_mut()) {
            imgui.prepare_frame(window, ctx);
        }
        if ctx.io().delta_time() <= 0.0 {
            ctx.io_mut().set_delta_time(MIN_DELTA_TIME);
        }
    }

    fn end_frame(&mut self, ctx: &mut Context) {
        let want_text_input = ctx.io().want_text_input();
        if want_text_input != self.state.ime_allowed {
            if let Some(window) = &self.state.window {
                window.set_ime_allowed(want_text_input);
            }
            self.state.ime_allowed = want_text_input;
        }
    }

    fn quit(&mut self) {
        self.state.quit_requested = true;
    }

    fn pixel_density_state(&self) -> &PixelDensity {
        &self.state.density
    }

    fn pixel_density_state_mut(&mut self) -> &mut PixelDensity {
        &mut self.state.density
    }
}

/// Creates the main window on the first `resumed`
struct WindowOpener {
    attributes: Option<WindowAttributes>,
    window: Option<Result<Window, OsError>>,
}

impl ApplicationHandler for WindowOpener {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(attributes) = self.attributes.take() {
            self.window = Some(event_loop.create_window(attributes));
        }
    }

    fn window_event(&mut self, _: &ActiveEventLoop, _: WindowId, _: WindowEvent) {}
}

/// One pump's worth of event routing into Dear ImGui and the renderer
struct EventPump<'a> {
    state: &'a mut WindowState,
    ctx: &'a mut Context,
    renderer: &'a mut dyn Renderer,
}

impl ApplicationHandler for EventPump<'_> {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let WindowState {
            window,
            imgui,
            occluded,
            close_requested,
            density,
            ..
        } = &mut *self.state;
        let Some(window) = window.as_ref() else {
            return;
        };
        if window.id() != window_id {
            return;
        }

        let full_event: Event<()> = Event::WindowEvent {
            window_id,
            event: event.clone(),
        };
        if let Some(imgui) = imgui.as_mut() {
            imgui.handle_event(self.ctx, window, &full_event);
        }

        match event {
            WindowEvent::Resized(size) => {
                self.renderer.resize(size.width, size.height);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                density.set(scale_factor as f32);
                let size = window.inner_size();
                self.renderer.resize(size.width, size.height);
            }
            WindowEvent::Occluded(is_occluded) => {
                *occluded = is_occluded;
            }
            WindowEvent::CloseRequested => {
                debug!("Close requested for the main window");
                *close_requested = true;
            }
            WindowEvent::Destroyed => {
                warn!("Main window destroyed by the windowing system");
                *close_requested = true;
            }
            _ => {}
        }
    }
}
