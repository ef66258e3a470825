//! User extension points
//!
//! Concrete applications plug their behavior into the lifecycle either by
//! implementing `AppHooks` or by handing closures to `AppBuilder` (stored in
//! `FnHooks`). Every hook receives an `AppContext` with the capabilities an
//! application needs mid-lifecycle: fonts, window control and textures.

use std::path::Path;

use dear_imgui_rs::{FontId, Ui};

use crate::error::AppResult;
use crate::platform::Platform;
use crate::renderer::{Renderer, TextureHandle};
use crate::texture;

/// Font handles loaded at startup. Owned by the Dear ImGui font atlas.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AppFonts {
    pub default: Option<FontId>,
    pub header: Option<FontId>,
}

/// Capabilities lent to hooks for the duration of one call
pub struct AppContext<'a> {
    name: &'a str,
    fonts: AppFonts,
    platform: &'a mut dyn Platform,
    renderer: &'a mut dyn Renderer,
}

impl<'a> AppContext<'a> {
    pub(crate) fn new(
        name: &'a str,
        fonts: AppFonts,
        platform: &'a mut dyn Platform,
        renderer: &'a mut dyn Renderer,
    ) -> Self {
        Self {
            name,
            fonts,
            platform,
            renderer,
        }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn default_font(&self) -> Option<FontId> {
        self.fonts.default
    }

    pub fn header_font(&self) -> Option<FontId> {
        self.fonts.header
    }

    pub fn set_title(&mut self, title: &str) {
        self.platform.set_main_window_title(title);
    }

    /// Close the main window; the loop ends at its next condition check.
    pub fn close(&mut self) -> bool {
        self.platform.close_main_window()
    }

    /// Request application exit; the loop ends at its next condition check.
    pub fn quit(&mut self) {
        self.platform.quit();
    }

    pub fn pixel_density(&self) -> f32 {
        self.platform.pixel_density()
    }

    pub fn load_texture(&mut self, path: impl AsRef<Path>) -> AppResult<TextureHandle> {
        texture::load_texture(self.renderer, path.as_ref())
    }

    pub fn create_texture(
        &mut self,
        rgba: &[u8],
        width: u32,
        height: u32,
    ) -> AppResult<TextureHandle> {
        texture::create_texture(self.renderer, rgba, width, height)
    }

    pub fn destroy_texture(&mut self, texture: TextureHandle) {
        self.renderer.destroy_texture(texture);
    }

    pub fn texture_width(&self, texture: TextureHandle) -> Option<u32> {
        self.renderer.texture_width(texture)
    }

    pub fn texture_height(&self, texture: TextureHandle) -> Option<u32> {
        self.renderer.texture_height(texture)
    }
}

/// Lifecycle hooks dispatched by `Application`. All default to no-ops.
pub trait AppHooks {
    /// After the window, renderer and fonts are ready, before the first frame.
    fn on_start(&mut self, _app: &mut AppContext<'_>) {}

    /// Once, after the frame loop exits, or when the initial frame of
    /// `Application::create` fails after `on_start` ran.
    fn on_stop(&mut self, _app: &mut AppContext<'_>) {}

    /// Every frame, inside the full-window content container.
    fn on_frame(&mut self, _ui: &Ui, _delta_time: f32, _app: &mut AppContext<'_>) {}
}

/// Hooks that do nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl AppHooks for NoHooks {}

pub type StartStopFn = Box<dyn FnMut(&mut AppContext<'_>)>;
pub type FrameFn = Box<dyn FnMut(&Ui, f32, &mut AppContext<'_>)>;

/// Closure-backed hooks (all optional)
#[derive(Default)]
pub struct FnHooks {
    pub on_start: Option<StartStopFn>,
    pub on_stop: Option<StartStopFn>,
    pub on_frame: Option<FrameFn>,
}

impl AppHooks for FnHooks {
    fn on_start(&mut self, app: &mut AppContext<'_>) {
        if let Some(cb) = self.on_start.as_mut() {
            cb(app);
        }
    }

    fn on_stop(&mut self, app: &mut AppContext<'_>) {
        if let Some(cb) = self.on_stop.as_mut() {
            cb(app);
        }
    }

    fn on_frame(&mut self, ui: &Ui, delta_time: f32, app: &mut AppContext<'_>) {
        if let Some(cb) = self.on_frame.as_mut() {
            cb(ui, delta_time, app);
        }
    }
}
