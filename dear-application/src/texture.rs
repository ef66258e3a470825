//! Image file → GPU texture loading

use std::path::Path;

use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::renderer::{Renderer, TextureHandle};

/// Tightly packed RGBA8 pixels decoded from an image file
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Decode any supported image format into RGBA8.
pub fn decode_rgba(path: &Path) -> AppResult<DecodedImage> {
    let image = image::open(path).map_err(|source| AppError::ImageDecode {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = image.into_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(DecodedImage {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

pub(crate) fn load_texture(renderer: &mut dyn Renderer, path: &Path) -> AppResult<TextureHandle> {
    let image = decode_rgba(path)?;
    let texture = create_texture(renderer, &image.pixels, image.width, image.height)?;
    debug!(
        "Loaded texture {} ({}x{}) as {:?}",
        path.display(),
        image.width,
        image.height,
        texture
    );
    Ok(texture)
}

pub(crate) fn create_texture(
    renderer: &mut dyn Renderer,
    rgba: &[u8],
    width: u32,
    height: u32,
) -> AppResult<TextureHandle> {
    renderer
        .create_texture(rgba, width, height)
        .map_err(AppError::Texture)
}
