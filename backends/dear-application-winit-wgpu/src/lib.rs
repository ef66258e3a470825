//! Winit + WGPU backends for dear-application
//!
//! `WinitPlatform` drives a winit 0.30 event loop one pump at a time and feeds
//! input into Dear ImGui through `dear-imgui-winit`. `WgpuRenderer` owns the
//! wgpu surface, device and queue, and submits draw data with `dear-imgui-wgpu`.
//!
//! ```no_run
//! use dear_application::Application;
//! use dear_application_winit_wgpu::{WinitWgpuConfig, create_platform, create_renderer};
//!
//! let config = WinitWgpuConfig::default();
//! let mut app = Application::new("Demo", create_platform(&config), create_renderer(&config));
//! if app.create(None, None).is_ok() {
//!     let _ = app.run();
//! }
//! ```

mod error;
mod platform;
mod renderer;

pub use error::WinitWgpuError;
pub use platform::WinitPlatform;
pub use renderer::WgpuRenderer;

use dear_application::{Platform, Renderer};

/// Backend configuration
#[derive(Clone, Debug)]
pub struct WinitWgpuConfig {
    /// Logical size used when the application asks for the default window size
    pub default_window_size: (u32, u32),
    pub resizable: bool,
    /// Falls back to `Fifo` when the surface does not support it
    pub present_mode: wgpu::PresentMode,
    pub power_preference: wgpu::PowerPreference,
    pub backends: wgpu::Backends,
}

impl Default for WinitWgpuConfig {
    fn default() -> Self {
        Self {
            default_window_size: (1280, 720),
            resizable: true,
            present_mode: wgpu::PresentMode::Fifo,
            power_preference: wgpu::PowerPreference::HighPerformance,
            backends: wgpu::Backends::PRIMARY,
        }
    }
}

/// Platform factory for the running desktop windowing system
pub fn create_platform(config: &WinitWgpuConfig) -> Box<dyn Platform> {
    Box::new(WinitPlatform::new(config))
}

/// Renderer factory; GPU resources are created in `Renderer::create`.
pub fn create_renderer(config: &WinitWgpuConfig) -> Box<dyn Renderer> {
    Box::new(WgpuRenderer::new(config))
}
