//! Minimal dear-application program: header font, frame stats, title and quit.

use dear_application::imgui::Ui;
use dear_application::logging::{init_tracing, init_tracing_dev};
use dear_application::{AppContext, AppHooks, Application};
use dear_application_winit_wgpu::{WinitWgpuConfig, create_platform, create_renderer};
use tracing::{error, info};

#[derive(Default)]
struct Hello {
    elapsed: f32,
    clicks: u32,
}

impl AppHooks for Hello {
    fn on_start(&mut self, app: &mut AppContext<'_>) {
        info!(
            "'{}' started at pixel density {:.2}",
            app.name(),
            app.pixel_density()
        );
    }

    fn on_frame(&mut self, ui: &Ui, delta_time: f32, app: &mut AppContext<'_>) {
        self.elapsed += delta_time;

        match app.header_font() {
            Some(font) => {
                let token = ui.push_font(font);
                ui.text("Hello from dear-application!");
                token.pop();
            }
            None => ui.text("Hello from dear-application!"),
        }
        ui.separator();

        ui.text(format!(
            "Application average {:.3} ms/frame ({:.1} FPS)",
            1000.0 / ui.io().framerate(),
            ui.io().framerate()
        ));
        ui.text(format!("Running for {:.1} s", self.elapsed));

        if ui.button("Click me") {
            self.clicks += 1;
            app.set_title(&format!("Hello ({} clicks)", self.clicks));
        }
        ui.same_line();
        if ui.button("Quit") {
            app.quit();
        }
    }

    fn on_stop(&mut self, _app: &mut AppContext<'_>) {
        info!("Stopping after {:.1} s and {} clicks", self.elapsed, self.clicks);
    }
}

fn main() {
    if std::env::args().any(|arg| arg == "--dev") {
        init_tracing_dev();
    } else {
        init_tracing();
    }

    let backend = WinitWgpuConfig::default();
    let mut app = Application::builder("Hello")
        .with_args(std::env::args().skip(1))
        .with_hooks(Hello::default())
        .build(create_platform(&backend), create_renderer(&backend));

    if let Err(e) = app.create(None, None) {
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
