/*!
The uniform block shared by `shader.wgsl#vertex_main` and `shader.wgsl#fragment_main`.

WGSL in `wgpu` has no portable `f64`, so the view rectangle is uploaded as two
`vec4<f32>`: the rounded value and the rounding error. The fragment shader adds
them back together with double-single arithmetic.
*/

use std::str::FromStr;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::viewport::Frame;

/// Binding of the uniform block in bind group 0.
pub const UNIFORMS_BINDING: u32 = 0;
/// Binding of the palette texture in bind group 0.
pub const PALETTE_TEXTURE_BINDING: u32 = 1;
/// Binding of the palette sampler in bind group 0.
pub const PALETTE_SAMPLER_BINDING: u32 = 2;

/// Mirrors `struct Uniforms` in `shader.wgsl`. Field order and padding matter.
#[repr(C)]
#[derive(Pod, Zeroable, Clone, Copy, Debug, PartialEq)]
pub struct Uniforms {
    pub mvp: [[f32; 4]; 4],
    pub lbrt_hi: [f32; 4],
    pub lbrt_lo: [f32; 4],
    pub max_iterations: f32,
    pub colour_period: f32,
    pub smooth_colouring: u32,
    _padding: u32,
}

impl Uniforms {
    pub fn new(frame: &Frame, precision: RectanglePrecision, smooth_colouring: bool) -> Self {
        let (lbrt_hi, lbrt_lo) = precision.encode(frame.lbrt);
        Self {
            mvp: frame.mvp.to_cols_array_2d(),
            lbrt_hi,
            lbrt_lo,
            max_iterations: frame.max_iterations,
            colour_period: frame.colour_period,
            smooth_colouring: smooth_colouring as u32,
            _padding: 0,
        }
    }
}

/// The uniform block on the GPU, rewritten in place once per drawn frame.
pub struct UniformBuffer {
    buffer: wgpu::Buffer,
}

impl UniformBuffer {
    pub fn new(device: &wgpu::Device, initial: &Uniforms) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniforms-buffer"),
            contents: bytemuck::bytes_of(initial),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        Self { buffer }
    }

    /// Lands before any command buffer submitted to `queue` afterwards.
    pub fn write(&self, queue: &wgpu::Queue, uniforms: &Uniforms) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(uniforms));
    }

    pub fn bind_group_entry(&self) -> wgpu::BindGroupEntry {
        wgpu::BindGroupEntry {
            binding: UNIFORMS_BINDING,
            resource: self.buffer.as_entire_binding(),
        }
    }
}

/// How the `f64` view rectangle reaches the GPU.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RectanglePrecision {
    /// Plain `f32` corners. Blocky once the zoom passes about `1e5`.
    Single,
    /// Each corner split into a high and a low `f32`, good to about 48 bits.
    Split,
}

impl RectanglePrecision {
    pub fn encode(self, lbrt: [f64; 4]) -> ([f32; 4], [f32; 4]) {
        let mut hi = [0.0; 4];
        let mut lo = [0.0; 4];
        for (index, value) in lbrt.iter().copied().enumerate() {
            let (high, low) = match self {
                RectanglePrecision::Single => (value as f32, 0.0),
                RectanglePrecision::Split => split(value),
            };
            hi[index] = high;
            lo[index] = low;
        }
        (hi, lo)
    }
}

impl FromStr for RectanglePrecision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(RectanglePrecision::Single),
            "split" => Ok(RectanglePrecision::Split),
            other => Err(format!("unknown precision `{}`", other)),
        }
    }
}

/// Splits `value` into `hi + lo` where `hi` is the nearest `f32`.
pub fn split(value: f64) -> (f32, f32) {
    let hi = value as f32;
    let lo = (value - hi as f64) as f32;
    (hi, lo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::model_view_projection;
    use std::mem::size_of;

    fn frame(lbrt: [f64; 4]) -> Frame {
        Frame {
            lbrt,
            mvp: model_view_projection(1.0),
            max_iterations: 42.5,
            colour_period: 100.0,
        }
    }

    #[test]
    fn layout_matches_the_wgsl_struct() {
        let zeroed = Uniforms::zeroed();
        assert_eq!(size_of::<Uniforms>(), 112);
        assert_eq!(bytemuck::offset_of!(zeroed, Uniforms, mvp), 0);
        assert_eq!(bytemuck::offset_of!(zeroed, Uniforms, lbrt_hi), 64);
        assert_eq!(bytemuck::offset_of!(zeroed, Uniforms, lbrt_lo), 80);
        assert_eq!(bytemuck::offset_of!(zeroed, Uniforms, max_iterations), 96);
        assert_eq!(bytemuck::offset_of!(zeroed, Uniforms, colour_period), 100);
        assert_eq!(bytemuck::offset_of!(zeroed, Uniforms, smooth_colouring), 104);
    }

    #[test]
    fn split_recovers_digits_lost_by_single_precision() {
        let value = 0.360_240_443_437_614_36_f64;
        let (hi, lo) = split(value);
        assert_ne!(hi as f64, value);
        assert!((hi as f64 + lo as f64 - value).abs() < 1e-14);
    }

    #[test]
    fn single_precision_drops_the_low_part() {
        let lbrt = [-0.75, 0.1, 0.360_240_443_437_614_36, 0.2];
        let (hi, lo) = RectanglePrecision::Single.encode(lbrt);
        assert_eq!(lo, [0.0; 4]);
        assert_eq!(hi, [-0.75, 0.1_f64 as f32, lbrt[2] as f32, 0.2_f64 as f32]);
    }

    #[test]
    fn keeps_adjacent_deep_zoom_corners_apart() {
        let lower = 0.360_240_443_437_614_36_f64;
        let upper = lower + 1e-12;
        let (hi, lo) = RectanglePrecision::Split.encode([lower, 0.0, upper, 1.0]);
        assert_eq!(hi[0], hi[2]);
        let width = (hi[2] as f64 + lo[2] as f64) - (hi[0] as f64 + lo[0] as f64);
        assert!((width - 1e-12).abs() < 1e-14);
    }

    #[test]
    fn packs_frame_values() {
        let uniforms = Uniforms::new(
            &frame([-2.0, -2.0, 2.0, 2.0]),
            RectanglePrecision::Split,
            true,
        );
        assert_eq!(uniforms.lbrt_hi, [-2.0, -2.0, 2.0, 2.0]);
        assert_eq!(uniforms.lbrt_lo, [0.0; 4]);
        assert_eq!(uniforms.max_iterations, 42.5);
        assert_eq!(uniforms.smooth_colouring, 1);
        assert_eq!(uniforms.mvp, model_view_projection(1.0).to_cols_array_2d());
    }
}
