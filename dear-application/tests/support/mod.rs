//! Recording test doubles for the platform/renderer boundary
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::sync::{Mutex, MutexGuard, OnceLock};

use dear_application::imgui::render::DrawData;
use dear_application::imgui::{BackendFlags, Context, Ui};
use dear_application::{
    AppConfig, AppContext, AppHooks, BackendError, BackendResult, IniFile, NativeWindow,
    PixelDensity, Platform, Renderer, TextureHandle, WindowSize, is_gui_context_live,
};

/// Dear ImGui allows one live context per process; serialize tests.
pub fn test_guard() -> MutexGuard<'static, ()> {
    static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
    GUARD
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Config that touches no files: no ini persistence, no font assets.
pub fn quiet_config() -> AppConfig {
    AppConfig::default()
        .with_ini_file(IniFile::Disabled)
        .with_default_font(None)
        .with_header_font(None)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    AppStart(Vec<String>),
    AppStop { gui_context_live: bool },
    OpenWindow { title: String, size: WindowSize },
    CloseWindow,
    SetTitle(String),
    ShowWindow,
    ProcessEvents,
    PlatformBeginFrame,
    PlatformEndFrame,
    Quit,
    RendererCreate,
    RendererDestroy { gui_context_live: bool },
    RendererBeginFrame,
    Clear([f32; 4]),
    /// Display size of the finalized draw data
    RenderDrawData { display_size: [f32; 2] },
    CreateTexture { width: u32, height: u32 },
    DestroyTexture(u64),
    DensityChanged(f32),
    OnStart,
    OnFrame,
    OnStop,
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

pub fn new_log() -> CallLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Display size `TestPlatform` reports every frame
pub const DISPLAY_SIZE: [f32; 2] = [800.0, 600.0];

/// Calls of one rendered frame, in the required order
pub fn frame_calls(clear_color: [f32; 4]) -> Vec<Call> {
    vec![
        Call::PlatformBeginFrame,
        Call::RendererBeginFrame,
        Call::OnFrame,
        Call::Clear(clear_color),
        Call::RenderDrawData {
            display_size: DISPLAY_SIZE,
        },
        Call::PlatformEndFrame,
    ]
}

pub fn count(log: &CallLog, call: &Call) -> usize {
    log.borrow().iter().filter(|c| *c == call).count()
}

pub struct TestPlatform {
    log: CallLog,
    pub fail_open: bool,
    /// Number of pump calls that report "keep running"
    pub pumps_before_exit: usize,
    /// Visibility reported per loop iteration; defaults to visible when exhausted
    pub visibility: VecDeque<bool>,
    /// Density written by the backend on successive pumps
    pub density_on_pump: VecDeque<f32>,
    pumps: usize,
    visible_now: bool,
    quit_requested: bool,
    window_open: bool,
    density: PixelDensity,
}

impl TestPlatform {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            fail_open: false,
            pumps_before_exit: 0,
            visibility: VecDeque::new(),
            density_on_pump: VecDeque::new(),
            pumps: 0,
            visible_now: true,
            quit_requested: false,
            window_open: false,
            density: PixelDensity::default(),
        }
    }

    pub fn failing_open(log: &CallLog) -> Self {
        Self {
            fail_open: true,
            ..Self::new(log)
        }
    }

    pub fn with_pumps(mut self, pumps: usize) -> Self {
        self.pumps_before_exit = pumps;
        self
    }

    pub fn with_visibility(mut self, visibility: &[bool]) -> Self {
        self.visibility = visibility.iter().copied().collect();
        self
    }

    pub fn with_density_on_pump(mut self, densities: &[f32]) -> Self {
        self.density_on_pump = densities.iter().copied().collect();
        self
    }

    fn record(&self, call: Call) {
        self.log.borrow_mut().push(call);
    }
}

impl Platform for TestPlatform {
    fn application_start(&mut self, args: &[String]) -> BackendResult<()> {
        self.record(Call::AppStart(args.to_vec()));
        Ok(())
    }

    fn application_stop(&mut self) {
        self.record(Call::AppStop {
            gui_context_live: is_gui_context_live(),
        });
    }

    fn open_main_window(
        &mut self,
        title: &str,
        size: WindowSize,
        ctx: &mut Context,
    ) -> BackendResult<()> {
        self.record(Call::OpenWindow {
            title: title.to_owned(),
            size,
        });
        if self.fail_open {
            return Err(BackendError::Platform("no display".into()));
        }
        let (width, height) = size.resolve((800, 600));
        ctx.io_mut()
            .set_display_size([width as f32, height as f32]);
        self.window_open = true;
        Ok(())
    }

    fn close_main_window(&mut self) -> bool {
        self.record(Call::CloseWindow);
        let was_open = self.window_open;
        self.window_open = false;
        was_open
    }

    fn main_window_handle(&self) -> Option<NativeWindow> {
        None
    }

    fn framebuffer_size(&self) -> Option<(u32, u32)> {
        self.window_open.then_some((800, 600))
    }

    fn set_main_window_title(&mut self, title: &str) {
        self.record(Call::SetTitle(title.to_owned()));
    }

    fn show_main_window(&mut self) {
        self.record(Call::ShowWindow);
    }

    fn process_events(&mut self, _ctx: &mut Context, _renderer: &mut dyn Renderer) -> bool {
        self.record(Call::ProcessEvents);
        if let Some(density) = self.density_on_pump.pop_front() {
            self.density.set(density);
        }
        self.visible_now = self.visibility.pop_front().unwrap_or(true);
        if self.quit_requested || !self.window_open || self.pumps >= self.pumps_before_exit {
            return false;
        }
        self.pumps += 1;
        true
    }

    fn is_main_window_visible(&self) -> bool {
        self.visible_now
    }

    fn begin_frame(&mut self, ctx: &mut Context) {
        self.record(Call::PlatformBeginFrame);
        let io = ctx.io_mut();
        io.set_display_size(DISPLAY_SIZE);
        io.set_delta_time(1.0 / 60.0);
    }

    fn end_frame(&mut self, _ctx: &mut Context) {
        self.record(Call::PlatformEndFrame);
    }

    fn quit(&mut self) {
        self.record(Call::Quit);
        self.quit_requested = true;
    }

    fn pixel_density_state(&self) -> &PixelDensity {
        &self.density
    }

    fn pixel_density_state_mut(&mut self) -> &mut PixelDensity {
        &mut self.density
    }
}

pub struct TestRenderer {
    log: CallLog,
    pub fail_create: bool,
    /// 1-based index of the `begin_frame` call that fails
    pub fail_begin_frame_at: Option<u64>,
    begin_frames: u64,
    next_texture: u64,
    textures: HashMap<u64, (u32, u32)>,
}

impl TestRenderer {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            fail_create: false,
            fail_begin_frame_at: None,
            begin_frames: 0,
            next_texture: 1,
            textures: HashMap::new(),
        }
    }

    pub fn failing_create(log: &CallLog) -> Self {
        Self {
            fail_create: true,
            ..Self::new(log)
        }
    }

    fn record(&self, call: Call) {
        self.log.borrow_mut().push(call);
    }
}

impl Renderer for TestRenderer {
    fn create(&mut self, _platform: &dyn Platform, ctx: &mut Context) -> BackendResult<()> {
        self.record(Call::RendererCreate);
        if self.fail_create {
            return Err(BackendError::Renderer("no adapter".into()));
        }
        let flags = ctx.io().backend_flags() | BackendFlags::RENDERER_HAS_TEXTURES;
        ctx.io_mut().set_backend_flags(flags);
        Ok(())
    }

    fn destroy(&mut self) {
        self.record(Call::RendererDestroy {
            gui_context_live: is_gui_context_live(),
        });
        self.textures.clear();
    }

    fn begin_frame(&mut self, _ctx: &mut Context) -> BackendResult<()> {
        self.record(Call::RendererBeginFrame);
        self.begin_frames += 1;
        if self.fail_begin_frame_at == Some(self.begin_frames) {
            return Err(BackendError::Surface("surface lost".into()));
        }
        Ok(())
    }

    fn pixel_density_changed(&mut self, density: f32) {
        self.record(Call::DensityChanged(density));
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.record(Call::Clear(color));
    }

    fn create_texture(
        &mut self,
        rgba: &[u8],
        width: u32,
        height: u32,
    ) -> BackendResult<TextureHandle> {
        self.record(Call::CreateTexture { width, height });
        if rgba.len() != (width * height * 4) as usize {
            return Err(BackendError::Texture("pixel buffer size mismatch".into()));
        }
        let id = self.next_texture;
        self.next_texture += 1;
        self.textures.insert(id, (width, height));
        Ok(TextureHandle::new(id))
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        self.record(Call::DestroyTexture(texture.id()));
        self.textures.remove(&texture.id());
    }

    fn texture_width(&self, texture: TextureHandle) -> Option<u32> {
        self.textures.get(&texture.id()).map(|(w, _)| *w)
    }

    fn texture_height(&self, texture: TextureHandle) -> Option<u32> {
        self.textures.get(&texture.id()).map(|(_, h)| *h)
    }

    fn render_draw_data(&mut self, draw_data: &DrawData) -> BackendResult<()> {
        assert!(draw_data.valid(), "draw data submitted before finalize");
        assert!(draw_data.draw_lists_count() > 0, "no content container drawn");
        self.record(Call::RenderDrawData {
            display_size: draw_data.display_size(),
        });
        Ok(())
    }
}

/// Hooks that record every dispatch and optionally quit after a number of frames
pub struct RecordingHooks {
    log: CallLog,
    pub quit_after_frames: Option<usize>,
    frames: usize,
}

impl RecordingHooks {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            quit_after_frames: None,
            frames: 0,
        }
    }

    pub fn quitting_after(log: &CallLog, frames: usize) -> Self {
        Self {
            quit_after_frames: Some(frames),
            ..Self::new(log)
        }
    }
}

impl AppHooks for RecordingHooks {
    fn on_start(&mut self, _app: &mut AppContext<'_>) {
        self.log.borrow_mut().push(Call::OnStart);
    }

    fn on_stop(&mut self, _app: &mut AppContext<'_>) {
        self.log.borrow_mut().push(Call::OnStop);
    }

    fn on_frame(&mut self, ui: &Ui, delta_time: f32, app: &mut AppContext<'_>) {
        self.log.borrow_mut().push(Call::OnFrame);
        assert!(delta_time > 0.0);
        // Called inside the full-display content container of a begun frame.
        assert_eq!(ui.window_pos(), [0.0, 0.0]);
        assert_eq!(ui.window_size(), ui.io().display_size());
        assert_eq!(ui.io().display_size(), DISPLAY_SIZE);
        ui.text(format!("frame {}", self.frames));
        self.frames += 1;
        if self.quit_after_frames == Some(self.frames) {
            app.quit();
        }
    }
}
