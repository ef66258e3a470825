//! Shows an image file as a texture.
//!
//! Usage: `image_viewer [PATH]` (defaults to `data/image.png`).

use std::path::PathBuf;

use dear_application::imgui::{TextureId, Ui};
use dear_application::logging::init_tracing_with_filter;
use dear_application::{AppConfig, AppContext, AppHooks, Application, TextureHandle, Theme};
use dear_application_winit_wgpu::{WinitWgpuConfig, create_platform, create_renderer};
use tracing::{error, warn};

struct ImageViewer {
    path: PathBuf,
    texture: Option<TextureHandle>,
    load_error: Option<String>,
    zoom: f32,
}

impl ImageViewer {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            texture: None,
            load_error: None,
            zoom: 1.0,
        }
    }
}

impl AppHooks for ImageViewer {
    fn on_start(&mut self, app: &mut AppContext<'_>) {
        match app.load_texture(&self.path) {
            Ok(texture) => {
                app.set_title(&format!("Image Viewer - {}", self.path.display()));
                self.texture = Some(texture);
            }
            Err(e) => {
                warn!("{e}");
                self.load_error = Some(e.to_string());
            }
        }
    }

    fn on_frame(&mut self, ui: &Ui, _delta_time: f32, app: &mut AppContext<'_>) {
        let Some(texture) = self.texture else {
            ui.text(format!("Could not load {}", self.path.display()));
            if let Some(err) = &self.load_error {
                ui.text_wrapped(err);
            }
            return;
        };

        let width = app.texture_width(texture).unwrap_or(0);
        let height = app.texture_height(texture).unwrap_or(0);
        ui.text(format!("{} ({width}x{height})", self.path.display()));
        if ui.button("-") {
            self.zoom = (self.zoom * 0.5).max(0.125);
        }
        ui.same_line();
        if ui.button("+") {
            self.zoom = (self.zoom * 2.0).min(8.0);
        }
        ui.same_line();
        ui.text(format!("{:.0}%", self.zoom * 100.0));
        ui.separator();

        ui.image(
            TextureId::from(texture),
            [width as f32 * self.zoom, height as f32 * self.zoom],
        );
    }

    fn on_stop(&mut self, app: &mut AppContext<'_>) {
        if let Some(texture) = self.texture.take() {
            app.destroy_texture(texture);
        }
    }
}

fn main() {
    init_tracing_with_filter("dear_application=debug,dear_application_winit_wgpu=info,wgpu=warn");

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/image.png"));

    let backend = WinitWgpuConfig::default();
    let config = AppConfig::default()
        .with_window_title("Image Viewer")
        .with_theme(Theme::Light)
        .with_clear_color([0.9, 0.9, 0.9, 1.0]);
    let mut app = Application::builder("ImageViewer")
        .with_config(config)
        .with_hooks(ImageViewer::new(path))
        .build(create_platform(&backend), create_renderer(&backend));

    if let Err(e) = app.create(Some(1024), Some(768)) {
        error!("Failed to create application: {e}");
        drop(app);
        std::process::exit(1);
    }

    let status = app.run().unwrap_or_else(|e| {
        error!("Application terminated with error: {e}");
        1
    });
    drop(app);
    std::process::exit(status);
}
