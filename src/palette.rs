//! Cyclic colour palette.
//!
//! The palette lives on the GPU as a tiny 1-D texture with repeat addressing
//! and linear filtering, so a lookup coordinate of `1.25` reads the same colour
//! as `0.25` and colours blend smoothly between entries, wrapping from the last
//! entry back to the first.

use log::debug;

use crate::uniforms::{PALETTE_SAMPLER_BINDING, PALETTE_TEXTURE_BINDING};

/// Blue, grey, orange, plum.
pub const DEFAULT_COLOURS: [[u8; 3]; 4] = [
    [0, 139, 224],
    [215, 215, 215],
    [223, 113, 0],
    [60, 0, 57],
];

#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    colours: Vec<[u8; 3]>,
}

impl Palette {
    /// Returns `None` for an empty palette.
    pub fn new(colours: Vec<[u8; 3]>) -> Option<Self> {
        if colours.is_empty() {
            None
        } else {
            Some(Self { colours })
        }
    }

    pub fn len(&self) -> usize {
        self.colours.len()
    }

    /// RGBA texels for upload; the alpha channel is always opaque.
    pub fn texels(&self) -> Vec<[u8; 4]> {
        self.colours
            .iter()
            .map(|[red, green, blue]| [*red, *green, *blue, u8::MAX])
            .collect()
    }

    /// Samples the palette the way the GPU sampler does.
    ///
    /// Texel `i` is centred on `(i + 0.5) / len`; coordinates between two
    /// centres blend linearly and wrap around at both ends.
    pub fn sample(&self, coordinate: f32) -> [f32; 3] {
        let len = self.colours.len() as i64;
        let position = coordinate.rem_euclid(1.0) * len as f32 - 0.5;
        let base = position.floor();
        let blend = position - base;
        let first = self.normalised((base as i64).rem_euclid(len) as usize);
        let second = self.normalised((base as i64 + 1).rem_euclid(len) as usize);
        [
            first[0] + (second[0] - first[0]) * blend,
            first[1] + (second[1] - first[1]) * blend,
            first[2] + (second[2] - first[2]) * blend,
        ]
    }

    fn normalised(&self, index: usize) -> [f32; 3] {
        let [red, green, blue] = self.colours[index];
        [
            red as f32 / 255.0,
            green as f32 / 255.0,
            blue as f32 / 255.0,
        ]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colours: DEFAULT_COLOURS.to_vec(),
        }
    }
}

/// The palette uploaded to the GPU together with its sampler.
pub struct PaletteTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

impl PaletteTexture {
    /// The palette bytes are used as they are, without sRGB decoding, so pair
    /// this with a non-sRGB surface format.
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, palette: &Palette) -> Self {
        debug!("uploading {} palette colours", palette.len());

        let size = wgpu::Extent3d {
            width: palette.len() as u32,
            height: 1,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("palette-texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D1,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        });

        let texels = palette.texels();
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(&texels),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: std::num::NonZeroU32::new(4 * size.width),
                rows_per_image: None,
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("palette-texture-view"),
            dimension: Some(wgpu::TextureViewDimension::D1),
            ..Default::default()
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("palette-sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            _texture: texture,
            view,
            sampler,
        }
    }

    pub fn bind_group_entries(&self) -> [wgpu::BindGroupEntry; 2] {
        [
            wgpu::BindGroupEntry {
                binding: PALETTE_TEXTURE_BINDING,
                resource: wgpu::BindingResource::TextureView(&self.view),
            },
            wgpu::BindGroupEntry {
                binding: PALETTE_SAMPLER_BINDING,
                resource: wgpu::BindingResource::Sampler(&self.sampler),
            },
        ]
    }
}
