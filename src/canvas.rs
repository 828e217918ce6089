use bytemuck::{Pod, Zeroable};

use crate::buffer;

/// One corner of the canvas quad.
///
/// `canvas` runs from `(0, 0)` at the lower left to `(1, 1)` at the upper
/// right. The fragment shader remaps it onto the current view rectangle, so
/// the quad itself never changes.
#[repr(C)]
#[derive(Pod, Zeroable, Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub canvas: [f32; 2],
}

/// Lower left, lower right, upper right, upper left.
pub const VERTICES: [Vertex; 4] = [
    Vertex {
        position: [-1.0, -1.0, 0.0],
        canvas: [0.0, 0.0],
    },
    Vertex {
        position: [1.0, -1.0, 0.0],
        canvas: [1.0, 0.0],
    },
    Vertex {
        position: [1.0, 1.0, 0.0],
        canvas: [1.0, 1.0],
    },
    Vertex {
        position: [-1.0, 1.0, 0.0],
        canvas: [0.0, 1.0],
    },
];

/// Two counter-clockwise triangles.
pub const INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

impl Vertex {
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// The quad's vertex and index buffers.
pub struct Canvas {
    vertices: buffer::Buffer<Vertex>,
    indices: buffer::Buffer<u16>,
}

impl Canvas {
    pub fn new(device: &wgpu::Device) -> Self {
        let vertices = buffer::Builder::from(&VERTICES[..])
            .with_label("canvas-vertex-buffer")
            .with_usage(wgpu::BufferUsages::VERTEX)
            .create(device);
        let indices = buffer::Builder::from(&INDICES[..])
            .with_label("canvas-index-buffer")
            .with_usage(wgpu::BufferUsages::INDEX)
            .create(device);
        Self { vertices, indices }
    }

    pub fn draw<'pass>(&'pass self, render_pass: &mut wgpu::RenderPass<'pass>) {
        render_pass.set_vertex_buffer(0, self.vertices.slice(..));
        render_pass.set_index_buffer(self.indices.slice(..), wgpu::IndexFormat::Uint16);
        render_pass.draw_indexed(0..self.indices.len() as u32, 0, 0..1);
    }
}
