//! Application lifecycle
//!
//! `Application` owns one platform, one renderer and the Dear ImGui context, and
//! drives them through `Constructed → Created → Running → Stopped`.
//!
//! Every frame runs the same fixed sequence:
//!
//! 1. `Platform::begin_frame` (input, display size, delta time)
//! 2. `Renderer::begin_frame` (surface acquisition)
//! 3. GUI frame begin
//! 4. full-window "Content" container + `AppHooks::on_frame`
//! 5. `Renderer::clear`
//! 6. GUI frame finalize (`Context::render`)
//! 7. `Renderer::render_draw_data`
//! 8. `Platform::end_frame`

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use dear_imgui_rs as imgui;
use dear_imgui_rs::{Condition, FontId, WindowFlags};
use tracing::{debug, error, info, warn};

use crate::config::{AppConfig, FontSpec};
use crate::error::{AppError, AppResult};
use crate::hooks::{AppContext, AppFonts, AppHooks, FnHooks, NoHooks};
use crate::platform::{Platform, WindowSize};
use crate::renderer::{Renderer, TextureHandle};
use crate::texture;

/// Name of the full-window container every frame is drawn into
pub const CONTENT_WINDOW_NAME: &str = "Content";

/// Flags of the full-window container: no chrome, no persistence, never raised.
pub fn content_window_flags() -> WindowFlags {
    WindowFlags::NO_TITLE_BAR
        | WindowFlags::NO_RESIZE
        | WindowFlags::NO_MOVE
        | WindowFlags::NO_SCROLLBAR
        | WindowFlags::NO_SCROLL_WITH_MOUSE
        | WindowFlags::NO_SAVED_SETTINGS
        | WindowFlags::NO_BRING_TO_FRONT_ON_FOCUS
}

/// Lifecycle state of an `Application`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AppState {
    /// Platform and renderer exist; no window, no GUI context
    Constructed,
    /// Window, renderer and GUI context are initialized
    Created,
    /// Inside `run`
    Running,
    /// `run` returned
    Stopped,
    /// `create` returned an error
    Failed,
}

// Dear ImGui keeps one current context per process.
static GUI_CONTEXT_LIVE: AtomicBool = AtomicBool::new(false);

/// Whether an `Application` currently owns a live Dear ImGui context
pub fn is_gui_context_live() -> bool {
    GUI_CONTEXT_LIVE.load(Ordering::Acquire)
}

struct LiveContextGuard;

impl LiveContextGuard {
    fn acquire() -> AppResult<Self> {
        GUI_CONTEXT_LIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| LiveContextGuard)
            .map_err(|_| AppError::ContextAlreadyActive)
    }
}

impl Drop for LiveContextGuard {
    fn drop(&mut self) {
        GUI_CONTEXT_LIVE.store(false, Ordering::Release);
    }
}

struct GuiState {
    // Declared before the guard: the context is destroyed first.
    context: imgui::Context,
    fonts: AppFonts,
    _guard: LiveContextGuard,
}

impl GuiState {
    fn create() -> AppResult<Self> {
        let guard = LiveContextGuard::acquire()?;
        let context = imgui::Context::create();
        debug!("Dear ImGui context created");
        Ok(Self {
            context,
            fonts: AppFonts::default(),
            _guard: guard,
        })
    }
}

/// A Dear ImGui application over pluggable platform and renderer backends
pub struct Application {
    name: String,
    config: AppConfig,
    platform: Box<dyn Platform>,
    renderer: Box<dyn Renderer>,
    hooks: Box<dyn AppHooks>,
    gui: Option<GuiState>,
    state: AppState,
    renderer_created: bool,
    frame_count: u64,
}

impl Application {
    /// Construct with default configuration and no-op hooks.
    pub fn new(
        name: impl Into<String>,
        platform: Box<dyn Platform>,
        renderer: Box<dyn Renderer>,
    ) -> Self {
        Self::from_parts(
            name.into(),
            AppConfig::default(),
            &[],
            platform,
            renderer,
            Box::new(NoHooks),
        )
    }

    pub fn builder(name: impl Into<String>) -> AppBuilder {
        AppBuilder::new(name)
    }

    fn from_parts(
        name: String,
        config: AppConfig,
        args: &[String],
        mut platform: Box<dyn Platform>,
        renderer: Box<dyn Renderer>,
        hooks: Box<dyn AppHooks>,
    ) -> Self {
        if let Err(e) = platform.application_start(args) {
            warn!("Platform start for '{name}' reported an error: {e}");
        }
        Self {
            name,
            config,
            platform,
            renderer,
            hooks,
            gui: None,
            state: AppState::Constructed,
            renderer_created: false,
            frame_count: 0,
        }
    }

    /// Create the GUI context, main window and renderer resources, then render
    /// one initial frame.
    ///
    /// `None` for either dimension selects the platform's default size. On error
    /// the application moves to `AppState::Failed` and must not be run. If the
    /// initial frame fails, `on_stop` is dispatched to pair with `on_start`.
    pub fn create(&mut self, width: Option<u32>, height: Option<u32>) -> AppResult<()> {
        self.expect_state(AppState::Constructed)?;

        let mut result = self.initialize(WindowSize::new(width, height));
        if result.is_ok() {
            result = self.frame();
            if result.is_err() {
                // `on_start` already ran.
                self.dispatch_on_stop();
            }
        }

        match result {
            Ok(()) => {
                self.state = AppState::Created;
                info!("Application '{}' created", self.name);
                Ok(())
            }
            Err(e) => {
                self.state = AppState::Failed;
                error!("Application '{}' failed to start: {e}", self.name);
                Err(e)
            }
        }
    }

    fn initialize(&mut self, size: WindowSize) -> AppResult<()> {
        let Self {
            name,
            config,
            platform,
            renderer,
            hooks,
            gui,
            renderer_created,
            ..
        } = self;
        let name = name.as_str();

        let gui = gui.insert(GuiState::create()?);

        platform
            .open_main_window(config.title_for(name), size, &mut gui.context)
            .map_err(AppError::WindowOpen)?;

        renderer
            .create(&**platform, &mut gui.context)
            .map_err(AppError::RendererCreate)?;
        *renderer_created = true;

        gui.context
            .set_ini_filename(config.ini_file.resolve(name))
            .map_err(|e| AppError::Gui(format!("ini filename: {e}")))?;
        gui.context
            .set_log_filename(None::<PathBuf>)
            .map_err(|e| AppError::Gui(format!("log filename: {e}")))?;

        gui.fonts = load_fonts(&mut gui.context, config);
        config.theme.apply(&mut gui.context);

        let mut app = AppContext::new(name, gui.fonts, &mut **platform, &mut **renderer);
        hooks.on_start(&mut app);
        Ok(())
    }

    /// Pump events and render frames until the platform reports termination.
    ///
    /// Returns the process exit status (`0` on normal termination). `on_stop`
    /// runs exactly once, also when a frame fails.
    pub fn run(&mut self) -> AppResult<i32> {
        self.expect_state(AppState::Created)?;
        self.state = AppState::Running;
        info!("Application '{}' running", self.name);

        self.platform.show_main_window();

        let mut result = Ok(0);
        while self.process_events() {
            self.forward_pixel_density();

            if !self.platform.is_main_window_visible() {
                continue;
            }

            if let Err(e) = self.frame() {
                error!("Frame {} failed: {e}", self.frame_count);
                result = Err(e);
                break;
            }
        }

        self.stop();
        result
    }

    fn process_events(&mut self) -> bool {
        let Self {
            platform,
            renderer,
            gui,
            ..
        } = self;
        match gui.as_mut() {
            Some(gui) => platform.process_events(&mut gui.context, &mut **renderer),
            None => false,
        }
    }

    fn forward_pixel_density(&mut self) {
        if !self.platform.has_pixel_density_changed() {
            return;
        }
        let density = self.platform.pixel_density();
        debug!("Pixel density changed to {density}");
        self.renderer.pixel_density_changed(density);
        self.platform.acknowledge_pixel_density_changed();
    }

    fn stop(&mut self) {
        self.dispatch_on_stop();

        self.state = AppState::Stopped;
        info!(
            "Application '{}' stopped after {} frames",
            self.name, self.frame_count
        );
    }

    fn dispatch_on_stop(&mut self) {
        let Self {
            name,
            platform,
            renderer,
            hooks,
            gui,
            ..
        } = self;
        let fonts = gui.as_ref().map(|gui| gui.fonts).unwrap_or_default();
        let mut app = AppContext::new(name.as_str(), fonts, &mut **platform, &mut **renderer);
        hooks.on_stop(&mut app);
    }

    fn frame(&mut self) -> AppResult<()> {
        let actual = self.state;
        let Self {
            name,
            config,
            platform,
            renderer,
            hooks,
            gui,
            frame_count,
            ..
        } = self;
        let Some(gui) = gui.as_mut() else {
            return Err(AppError::InvalidState {
                expected: AppState::Created,
                actual,
            });
        };
        let name = name.as_str();

        platform.begin_frame(&mut gui.context);
        renderer
            .begin_frame(&mut gui.context)
            .map_err(AppError::Frame)?;

        let (display_size, delta_time) = {
            let io = gui.context.io();
            (io.display_size(), io.delta_time())
        };
        let fonts = gui.fonts;

        let ui: &imgui::Ui = gui.context.frame();
        ui.window(CONTENT_WINDOW_NAME)
            .flags(content_window_flags())
            .position([0.0, 0.0], Condition::Always)
            .size(display_size, Condition::Always)
            .build(|| {
                let mut app =
                    AppContext::new(name, fonts, &mut **platform, &mut **renderer);
                hooks.on_frame(ui, delta_time, &mut app);
            });

        renderer.clear(config.clear_color);
        let draw_data = gui.context.render();
        renderer
            .render_draw_data(draw_data)
            .map_err(AppError::Frame)?;

        platform.end_frame(&mut gui.context);
        *frame_count += 1;
        Ok(())
    }

    fn expect_state(&self, expected: AppState) -> AppResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(AppError::InvalidState {
                expected,
                actual: self.state,
            })
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Frames rendered so far, including the initial frame rendered by `create`
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn platform(&self) -> &dyn Platform {
        &*self.platform
    }

    pub fn renderer(&self) -> &dyn Renderer {
        &*self.renderer
    }

    pub fn default_font(&self) -> Option<FontId> {
        self.gui.as_ref().and_then(|gui| gui.fonts.default)
    }

    pub fn header_font(&self) -> Option<FontId> {
        self.gui.as_ref().and_then(|gui| gui.fonts.header)
    }

    pub fn set_title(&mut self, title: &str) {
        self.platform.set_main_window_title(title);
    }

    /// Close the main window; `run` exits at its next loop-condition check.
    pub fn close(&mut self) -> bool {
        self.platform.close_main_window()
    }

    /// Request exit; `run` exits at its next loop-condition check.
    pub fn quit(&mut self) {
        self.platform.quit();
    }

    /// Decode an image file and upload it as a texture.
    ///
    /// Decode failures never reach the renderer.
    pub fn load_texture(&mut self, path: impl AsRef<Path>) -> AppResult<TextureHandle> {
        texture::load_texture(&mut *self.renderer, path.as_ref())
    }

    pub fn create_texture(
        &mut self,
        rgba: &[u8],
        width: u32,
        height: u32,
    ) -> AppResult<TextureHandle> {
        texture::create_texture(&mut *self.renderer, rgba, width, height)
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

impl Drop for Application {
    fn drop(&mut self) {
        if self.renderer_created {
            self.renderer.destroy();
            self.renderer_created = false;
        }
        self.platform.application_stop();
        if self.gui.take().is_some() {
            debug!("Dear ImGui context destroyed");
        }
    }
}

fn load_fonts(ctx: &mut imgui::Context, config: &AppConfig) -> AppFonts {
    let default_data = config.default_font.as_ref().and_then(read_font);
    let header_data = config.header_font.as_ref().and_then(read_font);

    let mut atlas = ctx.fonts();
    let mut add = |loaded: &Option<(&FontSpec, Vec<u8>)>| -> Option<FontId> {
        let (font, data) = loaded.as_ref()?;
        let cfg = font.font_config();
        match atlas.add_font_from_memory_ttf(data, font.size_pixels, Some(&cfg), None) {
            Some(added) => Some(added.id()),
            None => {
                warn!(
                    "Font {} could not be parsed, using the built-in font",
                    font.path.display()
                );
                None
            }
        }
    };
    let default = add(&default_data);
    let header = add(&header_data);
    atlas.build();

    AppFonts { default, header }
}

fn read_font(font: &FontSpec) -> Option<(&FontSpec, Vec<u8>)> {
    match std::fs::read(&font.path) {
        Ok(data) if is_truetype(&data) => Some((font, data)),
        Ok(_) => {
            warn!("Not a TrueType font, skipping: {}", font.path.display());
            None
        }
        Err(e) => {
            warn!("Font {} unavailable: {e}", font.path.display());
            None
        }
    }
}

// sfnt version 0x00010000 or 'true'; the stb rasterizer rejects CFF and collections.
fn is_truetype(data: &[u8]) -> bool {
    matches!(data.get(0..4), Some(b"\x00\x01\x00\x00" | b"true"))
}

/// Builder for `Application`
pub struct AppBuilder {
    name: String,
    config: AppConfig,
    args: Vec<String>,
    hooks: Option<Box<dyn AppHooks>>,
    fn_hooks: FnHooks,
}

impl AppBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: AppConfig::default(),
            args: Vec::new(),
            hooks: None,
            fn_hooks: FnHooks::default(),
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Process arguments forwarded to `Platform::application_start`
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Use a hooks object. Takes precedence over closures registered with `on_*`.
    pub fn with_hooks<H: AppHooks + 'static>(mut self, hooks: H) -> Self {
        self.hooks = Some(Box::new(hooks));
        self
    }

    pub fn on_start<F: FnMut(&mut AppContext<'_>) + 'static>(mut self, f: F) -> Self {
        self.fn_hooks.on_start = Some(Box::new(f));
        self
    }

    pub fn on_stop<F: FnMut(&mut AppContext<'_>) + 'static>(mut self, f: F) -> Self {
        self.fn_hooks.on_stop = Some(Box::new(f));
        self
    }

    pub fn on_frame<F: FnMut(&imgui::Ui, f32, &mut AppContext<'_>) + 'static>(
        mut self,
        f: F,
    ) -> Self {
        self.fn_hooks.on_frame = Some(Box::new(f));
        self
    }

    pub fn build(self, platform: Box<dyn Platform>, renderer: Box<dyn Renderer>) -> Application {
        let hooks = self.hooks.unwrap_or_else(|| Box::new(self.fn_hooks));
        Application::from_parts(
            self.name,
            self.config,
            &self.args,
            platform,
            renderer,
            hooks,
        )
    }
}
