/*!
Typed `wgpu` buffers.

A `wgpu::Buffer` is just bytes; nothing stops you from filling an index buffer
with vertices. [`Buffer<A>`] remembers what it was created from so the canvas
can only hand the render pass the kind of data it expects.
*/

use std::{marker::PhantomData, ops::RangeBounds};

use wgpu::util::DeviceExt;

pub struct Buffer<A> {
    buffer: wgpu::Buffer,
    len: usize,
    phantom_data: PhantomData<A>,
}

impl<A: bytemuck::Pod + bytemuck::Zeroable> Buffer<A> {
    /// Number of `A`s the buffer was created with.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub fn slice<S: RangeBounds<wgpu::BufferAddress>>(&self, bounds: S) -> wgpu::BufferSlice {
        self.buffer.slice(bounds)
    }
}

pub struct Builder<'a, A> {
    label: Option<&'a str>,
    contents: &'a [A],
    usage: wgpu::BufferUsages,
}

impl<'a, A: bytemuck::Pod + bytemuck::Zeroable> From<&'a [A]> for Builder<'a, A> {
    fn from(contents: &'a [A]) -> Self {
        Self {
            label: None,
            contents,
            usage: wgpu::BufferUsages::empty(),
        }
    }
}

impl<'a, A: bytemuck::Pod + bytemuck::Zeroable> Builder<'a, A> {
    pub fn with_label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }

    pub fn with_usage(mut self, usage: wgpu::BufferUsages) -> Self {
        self.usage |= usage;
        self
    }

    pub fn create(self, device: &wgpu::Device) -> Buffer<A> {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: self.label,
            contents: bytemuck::cast_slice(self.contents),
            usage: self.usage,
        });

        Buffer {
            buffer,
            len: self.contents.len(),
            phantom_data: PhantomData,
        }
    }
}
