//! Platform backend contract
//!
//! A platform owns the OS window and the event pump. The `Application` drives it
//! through the `Platform` trait and passes the Dear ImGui context explicitly to
//! every call that needs to feed input or display state into the GUI.

use dear_imgui_rs::Context;
use raw_window_handle::{
    DisplayHandle, HandleError, HasDisplayHandle, HasWindowHandle, RawDisplayHandle,
    RawWindowHandle, WindowHandle,
};

use crate::error::BackendResult;
use crate::renderer::Renderer;

/// Requested main window size. `None` in either dimension selects the backend default.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct WindowSize {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl WindowSize {
    pub const DEFAULT: Self = Self {
        width: None,
        height: None,
    };

    pub fn new(width: Option<u32>, height: Option<u32>) -> Self {
        Self { width, height }
    }

    /// Resolve against the backend's default size
    pub fn resolve(self, default: (u32, u32)) -> (u32, u32) {
        (
            self.width.unwrap_or(default.0),
            self.height.unwrap_or(default.1),
        )
    }
}

/// Pixel density tracking with change detection.
///
/// Backends write the density reported by the windowing system; consumers read
/// the dirty flag and acknowledge it after rescaling.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PixelDensity {
    density: f32,
    changed: bool,
}

impl Default for PixelDensity {
    fn default() -> Self {
        Self {
            density: 1.0,
            changed: false,
        }
    }
}

impl PixelDensity {
    pub fn get(&self) -> f32 {
        self.density
    }

    /// Store a new density; marks the value dirty only when it differs.
    pub fn set(&mut self, density: f32) {
        if density == self.density {
            return;
        }
        self.density = density;
        self.changed = true;
    }

    pub fn has_changed(&self) -> bool {
        self.changed
    }

    pub fn acknowledge(&mut self) {
        self.changed = false;
    }
}

/// Raw window + display handles of the main window.
///
/// Renderers use this to create a presentation surface.
#[derive(Copy, Clone, Debug)]
pub struct NativeWindow {
    window: RawWindowHandle,
    display: RawDisplayHandle,
}

impl NativeWindow {
    /// # Safety
    ///
    /// Both handles must stay valid for as long as the platform keeps the main
    /// window open.
    pub unsafe fn from_raw(window: RawWindowHandle, display: RawDisplayHandle) -> Self {
        Self { window, display }
    }

    pub fn raw_window_handle(&self) -> RawWindowHandle {
        self.window
    }

    pub fn raw_display_handle(&self) -> RawDisplayHandle {
        self.display
    }
}

impl HasWindowHandle for NativeWindow {
    fn window_handle(&self) -> Result<WindowHandle<'_>, HandleError> {
        // SAFETY: validity is guaranteed by the `from_raw` contract.
        Ok(unsafe { WindowHandle::borrow_raw(self.window) })
    }
}

impl HasDisplayHandle for NativeWindow {
    fn display_handle(&self) -> Result<DisplayHandle<'_>, HandleError> {
        // SAFETY: validity is guaranteed by the `from_raw` contract.
        Ok(unsafe { DisplayHandle::borrow_raw(self.display) })
    }
}

/// OS window and event pump capability consumed by `Application`.
pub trait Platform {
    /// Called once when the application is constructed.
    fn application_start(&mut self, args: &[String]) -> BackendResult<()>;

    /// Called once during application teardown, after the renderer is destroyed.
    fn application_stop(&mut self);

    /// Open the single main window. `ctx` receives initial display size and scale.
    fn open_main_window(
        &mut self,
        title: &str,
        size: WindowSize,
        ctx: &mut Context,
    ) -> BackendResult<()>;

    /// Request the main window to close. Returns whether a window was closed.
    fn close_main_window(&mut self) -> bool;

    fn main_window_handle(&self) -> Option<NativeWindow>;

    /// Physical size of the main window's drawable area
    fn framebuffer_size(&self) -> Option<(u32, u32)>;

    fn set_main_window_title(&mut self, title: &str);

    fn show_main_window(&mut self);

    /// Pump pending OS events once. Returns `false` when the application should stop.
    ///
    /// The renderer is lent for the duration of the call so surface changes
    /// (resize, density) can be forwarded to it.
    fn process_events(&mut self, ctx: &mut Context, renderer: &mut dyn Renderer) -> bool;

    fn is_main_window_visible(&self) -> bool;

    /// Establish input and display state for the coming GUI frame.
    ///
    /// Implementations must leave a positive delta time in `ctx`'s IO.
    fn begin_frame(&mut self, ctx: &mut Context);

    fn end_frame(&mut self, ctx: &mut Context);

    /// Request the event pump to report termination on its next call.
    fn quit(&mut self);

    fn pixel_density_state(&self) -> &PixelDensity;

    fn pixel_density_state_mut(&mut self) -> &mut PixelDensity;

    fn pixel_density(&self) -> f32 {
        self.pixel_density_state().get()
    }

    fn set_pixel_density(&mut self, density: f32) {
        self.pixel_density_state_mut().set(density);
    }

    fn has_pixel_density_changed(&self) -> bool {
        self.pixel_density_state().has_changed()
    }

    fn acknowledge_pixel_density_changed(&mut self) {
        self.pixel_density_state_mut().acknowledge();
    }
}
