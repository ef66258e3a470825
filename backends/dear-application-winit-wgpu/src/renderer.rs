//! WGPU renderer: surface, device, textures and draw submission

use std::collections::HashMap;

use dear_application::imgui::Context;
use dear_application::imgui::render::DrawData;
use dear_application::{BackendError, BackendResult, Platform, Renderer, TextureHandle};
use dear_imgui_wgpu as imgui_wgpu;
use pollster::block_on;
use tracing::{debug, info, warn};
use wgpu::SurfaceError;

use crate::WinitWgpuConfig;
use crate::error::WinitWgpuError;

/// WGPU-backed `Renderer`
pub struct WgpuRenderer {
    present_mode: wgpu::PresentMode,
    power_preference: wgpu::PowerPreference,
    backends: wgpu::Backends,
    gpu: Option<GpuState>,
    textures: HashMap<TextureHandle, TextureEntry>,
    clear_color: wgpu::Color,
    // Acquired in `begin_frame`, presented in `render_draw_data`.
    frame: Option<wgpu::SurfaceTexture>,
}

struct GpuState {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_desc: wgpu::SurfaceConfiguration,
    surface: wgpu::Surface<'static>,
    imgui: imgui_wgpu::WgpuRenderer,
}

struct TextureEntry {
    // Keeps the GPU allocation alive while registered.
    _texture: wgpu::Texture,
    width: u32,
    height: u32,
}

impl WgpuRenderer {
    pub fn new(config: &WinitWgpuConfig) -> Self {
        Self {
            present_mode: config.present_mode,
            power_preference: config.power_preference,
            backends: config.backends,
            gpu: None,
            textures: HashMap::new(),
            clear_color: wgpu::Color::BLACK,
            frame: None,
        }
    }

    /// WGPU device, once created
    pub fn device(&self) -> Option<&wgpu::Device> {
        self.gpu.as_ref().map(|gpu| &gpu.device)
    }

    /// Default WGPU queue, once created
    pub fn queue(&self) -> Option<&wgpu::Queue> {
        self.gpu.as_ref().map(|gpu| &gpu.queue)
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    fn gpu_mut(&mut self) -> BackendResult<&mut GpuState> {
        self.gpu
            .as_mut()
            .ok_or_else(|| BackendError::Renderer("renderer not created".into()))
    }

    fn create_gpu(
        &self,
        platform: &dyn Platform,
        ctx: &mut Context,
    ) -> Result<GpuState, WinitWgpuError> {
        let Some(native) = platform.main_window_handle() else {
            return Err(WinitWgpuError::Handle(
                raw_window_handle::HandleError::Unavailable,
            ));
        };
        let (width, height) = platform.framebuffer_size().unwrap_or((1, 1));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: self.backends,
            ..Default::default()
        });

        // SAFETY: the platform keeps the main window alive until after
        // `Renderer::destroy` has run.
        let surface = unsafe {
            instance.create_surface_unsafe(wgpu::SurfaceTargetUnsafe::from_window(&native)?)?
        };

        let adapter = block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: self.power_preference,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;
        let adapter_info = adapter.get_info();
        info!(
            "Using GPU adapter '{}' ({:?})",
            adapter_info.name, adapter_info.backend
        );

        let (device, queue) = block_on(adapter.request_device(&wgpu::DeviceDescriptor::default()))?;

        let caps = surface.get_capabilities(&adapter);
        let preferred_srgb = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        let format = preferred_srgb
            .iter()
            .copied()
            .find(|f| caps.formats.contains(f))
            .or_else(|| caps.formats.first().copied())
            .ok_or(WinitWgpuError::NoSurfaceFormat)?;
        let present_mode = if caps.present_modes.contains(&self.present_mode) {
            self.present_mode
        } else {
            warn!(
                "Present mode {:?} unsupported, falling back to Fifo",
                self.present_mode
            );
            wgpu::PresentMode::Fifo
        };

        let surface_desc = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_desc);

        let init_info = imgui_wgpu::WgpuInitInfo::new(device.clone(), queue.clone(), format);
        let mut imgui = imgui_wgpu::WgpuRenderer::new(init_info, ctx)
            .map_err(|e| WinitWgpuError::Imgui(e.to_string()))?;
        imgui.set_gamma_mode(imgui_wgpu::GammaMode::Auto);

        Ok(GpuState {
            device,
            queue,
            surface_desc,
            surface,
            imgui,
        })
    }
}

impl Renderer for WgpuRenderer {
    fn create(&mut self, platform: &dyn Platform, ctx: &mut Context) -> BackendResult<()> {
        let gpu = self.create_gpu(platform, ctx)?;
        info!(
            "WGPU renderer created ({:?}, {}x{})",
            gpu.surface_desc.format, gpu.surface_desc.width, gpu.surface_desc.height
        );
        self.gpu = Some(gpu);
        Ok(())
    }

    fn destroy(&mut self) {
        self.frame = None;
        for (handle, _) in self.textures.drain() {
            if let Some(gpu) = self.gpu.as_mut() {
                gpu.imgui.unregister_texture(handle.id());
            }
        }
        if let Some(mut gpu) = self.gpu.take() {
            gpu.imgui.shutdown();
            info!("WGPU renderer destroyed");
        }
    }

    fn begin_frame(&mut self, _ctx: &mut Context) -> BackendResult<()> {
        let gpu = self.gpu_mut()?;
        let frame = match gpu.surface.get_current_texture() {
            Ok(frame) => Some(frame),
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                debug!("Surface lost or outdated, reconfiguring");
                gpu.surface.configure(&gpu.device, &gpu.surface_desc);
                None
            }
            Err(SurfaceError::Timeout) => None,
            Err(e) => return Err(WinitWgpuError::from(e).into()),
        };
        gpu.imgui
            .new_frame()
            .map_err(|e| BackendError::Renderer(format!("new_frame failed: {e}")))?;
        self.frame = frame;
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        if width > 0 && height > 0 {
            gpu.surface_desc.width = width;
            gpu.surface_desc.height = height;
            gpu.surface.configure(&gpu.device, &gpu.surface_desc);
        }
    }

    fn pixel_density_changed(&mut self, density: f32) {
        debug!("Renderer notified of pixel density {density}");
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.clear_color = wgpu::Color {
            r: color[0] as f64,
            g: color[1] as f64,
            b: color[2] as f64,
            a: color[3] as f64,
        };
    }

    fn create_texture(
        &mut self,
        rgba: &[u8],
        width: u32,
        height: u32,
    ) -> BackendResult<TextureHandle> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || rgba.len() != expected {
            return Err(BackendError::Texture(format!(
                "{width}x{height} RGBA texture needs {expected} bytes, got {}",
                rgba.len()
            )));
        }
        let gpu = self.gpu_mut()?;

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("dear-application texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        gpu.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let handle = TextureHandle::new(gpu.imgui.register_external_texture(&texture, &view));

        self.textures.insert(
            handle,
            TextureEntry {
                _texture: texture,
                width,
                height,
            },
        );
        Ok(handle)
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        if self.textures.remove(&texture).is_none() {
            return;
        }
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.imgui.unregister_texture(texture.id());
        }
    }

    fn texture_width(&self, texture: TextureHandle) -> Option<u32> {
        self.textures.get(&texture).map(|entry| entry.width)
    }

    fn texture_height(&self, texture: TextureHandle) -> Option<u32> {
        self.textures.get(&texture).map(|entry| entry.height)
    }

    fn render_draw_data(&mut self, draw_data: &DrawData) -> BackendResult<()> {
        // No surface texture this frame (lost, outdated or timed out).
        let Some(frame) = self.frame.take() else {
            return Ok(());
        };
        let clear_color = self.clear_color;
        let gpu = self.gpu_mut()?;

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("dear-application encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("dear-application pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            gpu.imgui
                .render_draw_data(draw_data, &mut rpass)
                .map_err(|e| BackendError::Renderer(format!("render_draw_data failed: {e}")))?;
        }

        gpu.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

impl Drop for WgpuRenderer {
    fn drop(&mut self) {
        if self.gpu.is_some() {
            self.destroy();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_queries_before_create() {
        let mut renderer = WgpuRenderer::new(&WinitWgpuConfig::default());
        let handle = TextureHandle::new(7);
        assert_eq!(renderer.texture_width(handle), None);
        assert_eq!(renderer.texture_height(handle), None);
        renderer.destroy_texture(handle);
        assert_eq!(renderer.texture_count(), 0);
    }

    #[test]
    fn create_texture_validates_buffer_size() {
        let mut renderer = WgpuRenderer::new(&WinitWgpuConfig::default());
        let err = renderer.create_texture(&[0u8; 15], 2, 2).unwrap_err();
        assert!(matches!(err, BackendError::Texture(_)));
        let err = renderer.create_texture(&[], 0, 0).unwrap_err();
        assert!(matches!(err, BackendError::Texture(_)));
    }

    #[test]
    fn create_texture_requires_gpu() {
        let mut renderer = WgpuRenderer::new(&WinitWgpuConfig::default());
        let err = renderer.create_texture(&[0u8; 16], 2, 2).unwrap_err();
        assert!(matches!(err, BackendError::Renderer(_)));
    }

    #[test]
    fn clear_color_is_stored_for_the_next_pass() {
        let mut renderer = WgpuRenderer::new(&WinitWgpuConfig::default());
        renderer.clear([0.25, 0.5, 0.75, 1.0]);
        assert_eq!(renderer.clear_color.r, 0.25);
        assert_eq!(renderer.clear_color.b, 0.75);
    }
}
