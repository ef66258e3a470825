//! Error types for the application framework
//!
//! `BackendError` is what `Platform` and `Renderer` implementations report across
//! the trait boundary. `AppError` is what the `Application` surfaces to callers.

use std::path::PathBuf;

use thiserror::Error;

use crate::application::AppState;

/// Result type for application operations
pub type AppResult<T> = Result<T, AppError>;

/// Result type for backend (platform/renderer) operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors reported by platform and renderer backends
#[derive(Debug, Error)]
pub enum BackendError {
    /// Windowing / event loop failure
    #[error("Platform error: {0}")]
    Platform(String),

    /// Graphics device or pipeline failure
    #[error("Renderer error: {0}")]
    Renderer(String),

    /// Presentation surface could not be acquired or configured
    #[error("Surface error: {0}")]
    Surface(String),

    /// Texture creation or lookup failure
    #[error("Texture error: {0}")]
    Texture(String),

    /// The backend does not implement the requested capability
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),
}

/// Errors that can occur while driving an `Application`
#[derive(Debug, Error)]
pub enum AppError {
    /// Another Dear ImGui context is already live in this process
    #[error("A Dear ImGui context is already active in this process")]
    ContextAlreadyActive,

    /// Operation requires a different lifecycle state
    #[error("Invalid application state: expected {expected:?}, found {actual:?}")]
    InvalidState { expected: AppState, actual: AppState },

    /// The platform could not open the main window
    #[error("Failed to open main window: {0}")]
    WindowOpen(#[source] BackendError),

    /// The renderer could not create its resources
    #[error("Failed to create renderer: {0}")]
    RendererCreate(#[source] BackendError),

    /// A backend call failed while rendering a frame
    #[error("Frame failed: {0}")]
    Frame(#[source] BackendError),

    /// Image file could not be read or decoded
    #[error("Failed to decode image {}: {source}", path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Texture pass-through failed in the renderer
    #[error("Texture operation failed: {0}")]
    Texture(#[source] BackendError),

    /// GUI library configuration failed
    #[error("GUI error: {0}")]
    Gui(String),
}

impl AppError {
    /// Whether this error was reported by a backend rather than by the framework itself
    pub fn is_backend_error(&self) -> bool {
        matches!(
            self,
            AppError::WindowOpen(_)
                | AppError::RendererCreate(_)
                | AppError::Frame(_)
                | AppError::Texture(_)
        )
    }
}
