use bytemuck::Zeroable;
use log::{debug, info, warn};
use winit::{dpi::PhysicalSize, window::Window};

use crate::{
    canvas::Canvas,
    command_encoder::{self, CommandEncoderExt},
    error::Error,
    palette::{Palette, PaletteTexture},
    shader::Program,
    uniforms::{UniformBuffer, Uniforms},
};

/// Owns every GPU resource. Dropping it releases them.
pub struct Renderer {
    surface: wgpu::Surface,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_configuration: wgpu::SurfaceConfiguration,
    program: Program,
    canvas: Canvas,
    _palette: PaletteTexture,
    uniforms: UniformBuffer,
    bind_group: wgpu::BindGroup,
}

impl Renderer {
    pub fn new(window: &Window, palette: &Palette) -> Result<Self, Error> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::Backends::all());
        let surface = unsafe { instance.create_surface(window) };

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            compatible_surface: Some(&surface),
        }))
        .ok_or(Error::NoAdapter)?;
        info!("using adapter {:?}", adapter.get_info());

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("device"),
                features: wgpu::Features::empty(),
                limits: wgpu::Limits::default(),
            },
            None,
        ))?;

        let format = preferred_format(&surface.get_supported_formats(&adapter))
            .ok_or(Error::NoSurfaceFormat)?;
        let surface_configuration = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
        };
        surface.configure(&device, &surface_configuration);
        debug!("surface configured as {:?}", surface_configuration);

        let program = Program::new(&device, format)?;
        let canvas = Canvas::new(&device);
        let palette = PaletteTexture::new(&device, &queue, palette);
        let uniforms = UniformBuffer::new(&device, &Uniforms::zeroed());

        let [palette_texture, palette_sampler] = palette.bind_group_entries();
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("mandelbrot-bind-group"),
            layout: program.bind_group_layout(),
            entries: &[uniforms.bind_group_entry(), palette_texture, palette_sampler],
        });

        Ok(Self {
            surface,
            device,
            queue,
            surface_configuration,
            program,
            canvas,
            _palette: palette,
            uniforms,
            bind_group,
        })
    }

    /// Ignores zero-sized windows; the surface keeps its old size until the
    /// window is restored.
    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        debug!("resizing to {:?}", size);
        self.surface_configuration.width = size.width;
        self.surface_configuration.height = size.height;
        self.surface.configure(&self.device, &self.surface_configuration);
    }

    /// Uploads `uniforms` and draws the canvas with them.
    ///
    /// The uniform write is queued before the frame's command buffer, so the
    /// draw always sees this frame's values.
    pub fn render(&mut self, uniforms: &Uniforms) -> Result<(), Error> {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(surface_texture) => surface_texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.surface_configuration);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("timed out waiting for the next frame");
                return Ok(());
            }
            Err(error) => return Err(Error::Surface(error)),
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.uniforms.write(&self.queue, uniforms);

        let command_buffer = command_encoder::record(&self.device, "render-pass", |encoder| {
            encoder.with_render_pass(
                &wgpu::RenderPassDescriptor {
                    label: Some("render-pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &surface_texture_view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                            store: true,
                        },
                    })],
                    depth_stencil_attachment: None,
                },
                |render_pass| {
                    render_pass.set_pipeline(self.program.pipeline());
                    render_pass.set_bind_group(0, &self.bind_group, &[]);
                    self.canvas.draw(render_pass);
                },
            )
        });

        self.queue.submit([command_buffer]);
        surface_texture.present();
        Ok(())
    }

    /// Blocks until the GPU has finished every submitted frame.
    pub fn finish(&self) {
        self.device.poll(wgpu::Maintain::Wait);
    }
}

/// The palette texture holds display-ready bytes, so prefer a surface that
/// does not apply sRGB encoding on write.
fn preferred_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|format| !format.describe().srgb)
        .or_else(|| formats.first().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_linear_surface_formats() {
        let formats = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Bgra8Unorm,
        ];
        assert_eq!(
            preferred_format(&formats),
            Some(wgpu::TextureFormat::Bgra8Unorm)
        );
    }

    #[test]
    fn falls_back_to_the_first_format() {
        let formats = [wgpu::TextureFormat::Rgba8UnormSrgb];
        assert_eq!(
            preferred_format(&formats),
            Some(wgpu::TextureFormat::Rgba8UnormSrgb)
        );
        assert_eq!(preferred_format(&[]), None);
    }
}
