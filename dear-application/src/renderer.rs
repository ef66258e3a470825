//! Renderer backend contract
//!
//! A renderer owns GPU-side resources: the presentation surface, textures and
//! whatever pipeline it needs to submit Dear ImGui draw data.

use dear_imgui_rs::Context;
use dear_imgui_rs::render::DrawData;

use crate::error::BackendResult;
use crate::platform::Platform;

/// Opaque texture identifier handed out by a `Renderer`.
///
/// The handle is owned by whoever created it until passed to `destroy_texture`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TextureHandle(u64);

impl TextureHandle {
    pub const NULL: Self = Self(0);

    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl From<TextureHandle> for dear_imgui_rs::TextureId {
    fn from(handle: TextureHandle) -> Self {
        dear_imgui_rs::TextureId::from(handle.0)
    }
}

/// GPU rendering capability consumed by `Application`.
pub trait Renderer {
    /// Create backend resources bound to the platform's main window.
    fn create(&mut self, platform: &dyn Platform, ctx: &mut Context) -> BackendResult<()>;

    /// Release every GPU resource. Called once during teardown, while the
    /// window and GUI context are still alive.
    fn destroy(&mut self);

    fn begin_frame(&mut self, ctx: &mut Context) -> BackendResult<()>;

    /// The platform's drawable area changed size.
    fn resize(&mut self, _width: u32, _height: u32) {}

    /// The platform's pixel density changed.
    fn pixel_density_changed(&mut self, _density: f32) {}

    /// Clear color for the next submitted frame (linear RGBA).
    fn clear(&mut self, color: [f32; 4]);

    /// Upload tightly packed RGBA8 pixels as a new texture.
    fn create_texture(&mut self, rgba: &[u8], width: u32, height: u32)
    -> BackendResult<TextureHandle>;

    fn destroy_texture(&mut self, texture: TextureHandle);

    fn texture_width(&self, texture: TextureHandle) -> Option<u32>;

    fn texture_height(&self, texture: TextureHandle) -> Option<u32>;

    /// Submit finalized draw data for presentation.
    fn render_draw_data(&mut self, draw_data: &DrawData) -> BackendResult<()>;
}
