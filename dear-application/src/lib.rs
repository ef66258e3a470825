//! dear-application: Dear ImGui application framework
//!
//! Owns a Dear ImGui context plus one platform (window + event pump) and one
//! renderer (GPU resources), and drives them through a fixed frame lifecycle.
//! Backends plug in through the `Platform` and `Renderer` traits; application
//! behavior plugs in through `AppHooks` or builder closures.
//!
//! ```no_run
//! use dear_application::imgui::Ui;
//! use dear_application::{AppContext, AppHooks, AppResult, Application, Platform, Renderer};
//!
//! struct Hello;
//!
//! impl AppHooks for Hello {
//!     fn on_frame(&mut self, ui: &Ui, _delta_time: f32, _app: &mut AppContext<'_>) {
//!         ui.text("Hello from dear-application!");
//!     }
//! }
//!
//! fn launch(platform: Box<dyn Platform>, renderer: Box<dyn Renderer>) -> AppResult<i32> {
//!     let mut app = Application::builder("Hello")
//!         .with_hooks(Hello)
//!         .build(platform, renderer);
//!     app.create(None, None)?;
//!     app.run()
//! }
//! ```

pub use dear_imgui_rs as imgui;

mod application;
pub mod config;
mod error;
mod hooks;
pub mod logging;
mod platform;
mod renderer;
pub mod texture;

pub use application::{
    AppBuilder, AppState, Application, CONTENT_WINDOW_NAME, content_window_flags,
    is_gui_context_live,
};
pub use config::{AppConfig, DEFAULT_CLEAR_COLOR, FontSpec, IniFile, Theme};
pub use error::{AppError, AppResult, BackendError, BackendResult};
pub use hooks::{AppContext, AppFonts, AppHooks, FnHooks, FrameFn, NoHooks, StartStopFn};
pub use platform::{NativeWindow, PixelDensity, Platform, WindowSize};
pub use renderer::{Renderer, TextureHandle};
