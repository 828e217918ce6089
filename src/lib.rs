//! A continuously zooming Mandelbrot set.
//!
//! The host keeps the visible region of the complex plane in `f64` and pulls
//! it toward a fixed point a little every frame ([`viewport`]). The GPU
//! evaluates the escape time of every pixel in a fragment shader
//! (`shader.wgsl`, restated for tests in [`evaluator`]) and colours it from a
//! small cyclic [`palette`].

pub mod buffer;
pub mod canvas;
pub mod clock;
pub mod command_encoder;
pub mod complex;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod evaluator;
pub mod palette;
pub mod renderer;
pub mod shader;
pub mod uniforms;
pub mod viewport;
