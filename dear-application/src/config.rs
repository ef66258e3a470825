//! Application configuration

use std::path::PathBuf;

use dear_imgui_rs as imgui;
use dear_imgui_rs::{FontConfig, ThemePreset};

/// Where Dear ImGui persists window/layout settings
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum IniFile {
    /// `<application-name>.ini` in the working directory
    #[default]
    FromName,
    /// Explicit path
    Path(PathBuf),
    /// No persistence
    Disabled,
}

impl IniFile {
    pub fn resolve(&self, app_name: &str) -> Option<PathBuf> {
        match self {
            IniFile::FromName => Some(PathBuf::from(format!("{app_name}.ini"))),
            IniFile::Path(path) => Some(path.clone()),
            IniFile::Disabled => None,
        }
    }
}

/// A TTF font file loaded into the atlas at startup
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    pub path: PathBuf,
    pub size_pixels: f32,
    pub oversample_h: i8,
    pub oversample_v: i8,
    pub pixel_snap_h: bool,
}

impl FontSpec {
    pub fn new(path: impl Into<PathBuf>, size_pixels: f32) -> Self {
        Self {
            path: path.into(),
            size_pixels,
            oversample_h: 4,
            oversample_v: 4,
            pixel_snap_h: false,
        }
    }

    pub(crate) fn font_config(&self) -> FontConfig {
        FontConfig::new()
            .size_pixels(self.size_pixels)
            .oversample_h(self.oversample_h)
            .oversample_v(self.oversample_v)
            .pixel_snap_h(self.pixel_snap_h)
    }
}

/// Built-in color themes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
    Classic,
}

impl Theme {
    pub(crate) fn apply(self, ctx: &mut imgui::Context) {
        let mut theme = imgui::Theme::default();
        theme.preset = match self {
            Theme::Dark => ThemePreset::Dark,
            Theme::Light => ThemePreset::Light,
            Theme::Classic => ThemePreset::Classic,
        };
        theme.apply_to_context(ctx);
    }
}

/// Background behind the content window: RGB(32, 32, 32)
pub const DEFAULT_CLEAR_COLOR: [f32; 4] = [32.0 / 255.0, 32.0 / 255.0, 32.0 / 255.0, 1.0];

/// Application configuration
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Main window title; `None` uses the application name
    pub window_title: Option<String>,
    pub ini_file: IniFile,
    pub default_font: Option<FontSpec>,
    pub header_font: Option<FontSpec>,
    pub theme: Theme,
    pub clear_color: [f32; 4],
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window_title: None,
            ini_file: IniFile::FromName,
            default_font: Some(FontSpec::new("data/Play-Regular.ttf", 18.0)),
            header_font: Some(FontSpec::new("data/Cuprum-Bold.ttf", 20.0)),
            theme: Theme::Dark,
            clear_color: DEFAULT_CLEAR_COLOR,
        }
    }
}

impl AppConfig {
    pub fn with_window_title(mut self, title: impl Into<String>) -> Self {
        self.window_title = Some(title.into());
        self
    }

    pub fn with_ini_file(mut self, ini_file: IniFile) -> Self {
        self.ini_file = ini_file;
        self
    }

    pub fn with_default_font(mut self, font: Option<FontSpec>) -> Self {
        self.default_font = font;
        self
    }

    pub fn with_header_font(mut self, font: Option<FontSpec>) -> Self {
        self.header_font = font;
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    pub(crate) fn title_for<'a>(&'a self, app_name: &'a str) -> &'a str {
        self.window_title.as_deref().unwrap_or(app_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_bundled_assets() {
        let cfg = AppConfig::default();
        let default_font = cfg.default_font.expect("default font");
        assert_eq!(default_font.path, PathBuf::from("data/Play-Regular.ttf"));
        assert_eq!(default_font.size_pixels, 18.0);
        assert_eq!((default_font.oversample_h, default_font.oversample_v), (4, 4));
        assert!(!default_font.pixel_snap_h);

        let header_font = cfg.header_font.expect("header font");
        assert_eq!(header_font.path, PathBuf::from("data/Cuprum-Bold.ttf"));
        assert_eq!(header_font.size_pixels, 20.0);
        assert_eq!(cfg.theme, Theme::Dark);
    }

    #[test]
    fn ini_file_resolution() {
        assert_eq!(
            IniFile::FromName.resolve("Blueprints"),
            Some(PathBuf::from("Blueprints.ini"))
        );
        assert_eq!(
            IniFile::Path("layout.ini".into()).resolve("Blueprints"),
            Some(PathBuf::from("layout.ini"))
        );
        assert_eq!(IniFile::Disabled.resolve("Blueprints"), None);
    }

    #[test]
    fn title_falls_back_to_name() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.title_for("Demo"), "Demo");
        let cfg = cfg.with_window_title("Custom");
        assert_eq!(cfg.title_for("Demo"), "Custom");
    }
}
