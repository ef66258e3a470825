use dear_application::BackendError;
use thiserror::Error;

/// Failures inside the winit/wgpu stack, folded into `BackendError` at the trait boundary
#[derive(Debug, Error)]
pub enum WinitWgpuError {
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("Window creation failed: {0}")]
    WindowCreation(#[from] winit::error::OsError),
    #[error("Event loop exited before the main window was created")]
    NotResumed,
    #[error("Window handle unavailable: {0}")]
    Handle(#[from] raw_window_handle::HandleError),
    #[error("Failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("No suitable GPU adapter found: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("request_device failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("Surface reports no supported texture formats")]
    NoSurfaceFormat,
    #[error("WGPU surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error("Dear ImGui renderer error: {0}")]
    Imgui(String),
}

impl From<WinitWgpuError> for BackendError {
    fn from(err: WinitWgpuError) -> Self {
        match err {
            WinitWgpuError::EventLoop(_)
            | WinitWgpuError::WindowCreation(_)
            | WinitWgpuError::NotResumed => BackendError::Platform(err.to_string()),
            WinitWgpuError::Surface(_) => BackendError::Surface(err.to_string()),
            _ => BackendError::Renderer(err.to_string()),
        }
    }
}
